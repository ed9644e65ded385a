// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use dts_api::{Api, Transport};
use dts_app::{
    ApiOutcome, AttachedFile, DashboardSnapshot, Department, Document, DocumentDropdowns,
    DocumentId, DocumentView, FieldErrors, FormPayload, QrSeries, QrSeriesPrint, SubmitAction,
    UserAccount, UserId,
};
use dts_testkit::OfficeFaker;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Serves the terminal UI from the live REST API.
pub struct ApiRuntime<T: Transport> {
    api: Api<T>,
}

impl<T: Transport> ApiRuntime<T> {
    pub fn new(api: Api<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> dts_tui::AppRuntime for ApiRuntime<T> {
    fn load_dashboard(&mut self) -> Result<DashboardSnapshot> {
        let counts = self.api.dashboard_counts()?;
        let user = match self.api.current_user() {
            Ok(user) => Some(user),
            Err(error) if error.needs_login() => return Err(error.into()),
            Err(error) => {
                warn!(error = %error, "current user unavailable");
                None
            }
        };
        Ok(DashboardSnapshot { counts, user })
    }

    fn load_documents(&mut self) -> Result<Vec<Document>> {
        Ok(self.api.my_documents()?)
    }

    fn load_users(&mut self) -> Result<Vec<UserAccount>> {
        let page = self.api.list_users()?;
        debug!(
            users = page.users.len(),
            total_pages = page.total_pages,
            "loaded user directory"
        );
        Ok(page.users)
    }

    fn load_departments(&mut self) -> Result<Vec<Department>> {
        Ok(self.api.departments()?)
    }

    fn load_qr_series(&mut self, office: &str) -> Result<Vec<QrSeries>> {
        Ok(self.api.qr_series(office)?)
    }

    fn view_document(&mut self, id: DocumentId) -> Result<DocumentView> {
        let detail = self.api.document_detail(id)?;
        let files = self.api.attached_files(id)?;
        Ok(DocumentView { detail, files })
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<ApiOutcome<()>> {
        Ok(self.api.delete_document(id)?)
    }

    fn load_document_dropdowns(&mut self) -> Result<DocumentDropdowns> {
        Ok(self.api.document_dropdowns()?)
    }

    fn submit_form(
        &mut self,
        payload: &FormPayload,
        action: SubmitAction,
    ) -> Result<ApiOutcome<()>> {
        let outcome = match payload {
            FormPayload::AddDocument(form) => self.api.add_document(form, action)?,
            FormPayload::RegisterUser(form) => self.api.register_user(form)?,
            FormPayload::AssignQr(form) => self.api.assign_qr_series(form)?,
        };
        Ok(outcome)
    }

    fn print_qr_series(&mut self, series: &str, office: &str) -> Result<QrSeriesPrint> {
        Ok(self.api.print_qr_series(series, office)?)
    }

    fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

const DEMO_DOCUMENTS: usize = 37;
const DEMO_USERS: usize = 23;
const DEMO_QR_SERIES: usize = 14;
const DEMO_BASE_URL: &str = "http://localhost";

/// In-memory runtime seeded with fixtures; backs `dts --demo`.
pub struct DemoRuntime {
    faker: OfficeFaker,
    dashboard: DashboardSnapshot,
    documents: Vec<Document>,
    users: Vec<UserAccount>,
    qr: BTreeMap<String, Vec<QrSeries>>,
}

impl DemoRuntime {
    pub fn new(seed: u64) -> Self {
        let mut faker = OfficeFaker::new(seed);
        let dashboard = faker.dashboard();
        let documents = faker.documents(DEMO_DOCUMENTS);
        let users = faker.users(DEMO_USERS);
        Self {
            faker,
            dashboard,
            documents,
            users,
            qr: BTreeMap::new(),
        }
    }

    fn office_series(&mut self, office: &str) -> &mut Vec<QrSeries> {
        let faker = &mut self.faker;
        self.qr
            .entry(office.to_owned())
            .or_insert_with(|| faker.qr_series(office, DEMO_QR_SERIES))
    }

    fn next_document_id(&self) -> i64 {
        self.documents
            .iter()
            .map(|document| document.id.get())
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_user_id(&self) -> i64 {
        self.users.iter().map(|user| user.id.get()).max().unwrap_or(0) + 1
    }

    fn add_document(
        &mut self,
        form: &dts_app::AddDocumentForm,
        action: SubmitAction,
    ) -> ApiOutcome<()> {
        let form = form.trimmed();
        let mut errors = FieldErrors::new();
        if form.doctitle.is_empty() {
            errors.push("doctitle", "The doctitle field is required.");
        }
        if let Err(errors) = errors.into_result() {
            return ApiOutcome::FieldErrors(errors);
        }

        let id = self.next_document_id();
        let office = self
            .dashboard
            .user
            .as_ref()
            .and_then(|user| user.office_dept.clone());
        let status = match action {
            SubmitAction::Submit => "Pending",
            SubmitAction::Draft => "Draft",
        };
        self.documents.push(Document {
            id: DocumentId::new(id),
            doc_title: Some(form.doctitle),
            tracking_number: Some(dts_testkit::tracking_number(id)),
            originating_office: office,
            latest_transaction: Some("Created".to_owned()),
            status: Some(status.to_owned()),
        });
        ApiOutcome::Success(())
    }

    fn register_user(&mut self, form: &dts_app::RegisterUserForm) -> ApiOutcome<()> {
        if let Err(errors) = form.validate() {
            return ApiOutcome::FieldErrors(errors);
        }
        let username = form.username.trim();
        if self
            .users
            .iter()
            .any(|user| user.username.as_deref() == Some(username))
        {
            let mut errors = FieldErrors::new();
            errors.push("username", "The username has already been taken.");
            return ApiOutcome::FieldErrors(errors);
        }

        let id = self.next_user_id();
        let name = format!("{} {}", form.name.trim(), form.last_name.trim());
        self.users.push(UserAccount {
            id: UserId::new(id),
            name: Some(name),
            office_dept: Some(form.office_dept.clone()).filter(|office| {
                !office.is_empty() && office != dts_app::UNSELECTED
            }),
            designation: Some(form.designation.trim().to_owned()),
            username: Some(username.to_owned()),
            active: Some("1".to_owned()),
        });
        ApiOutcome::Success(())
    }

    fn assign_qr_series(&mut self, form: &dts_app::AssignQrForm) -> ApiOutcome<()> {
        if let Err(errors) = form.validate() {
            return ApiOutcome::FieldErrors(errors);
        }
        let Some(amount) = form.amount_value() else {
            return ApiOutcome::GeneralError("Amount must be a positive whole number.".to_owned());
        };
        let office = form.selected_office.clone();
        let month = form.for_month_year.trim().to_owned();
        let series = self.office_series(&office);
        let number = series.len() + 1;
        series.push(QrSeries {
            series: Some(format!("{office}-{month}-{number:03}")),
            office: Some(office.clone()),
            for_month_year: Some(month),
            initial_count: Some(amount),
            remaining: Some(amount),
            used: Some(0),
        });
        ApiOutcome::Success(())
    }
}

impl dts_tui::AppRuntime for DemoRuntime {
    fn load_dashboard(&mut self) -> Result<DashboardSnapshot> {
        Ok(self.dashboard.clone())
    }

    fn load_documents(&mut self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    fn load_users(&mut self) -> Result<Vec<UserAccount>> {
        Ok(self.users.clone())
    }

    fn load_departments(&mut self) -> Result<Vec<Department>> {
        Ok(dts_testkit::departments())
    }

    fn load_qr_series(&mut self, office: &str) -> Result<Vec<QrSeries>> {
        Ok(self.office_series(office).clone())
    }

    fn view_document(&mut self, id: DocumentId) -> Result<DocumentView> {
        let document = self
            .documents
            .iter()
            .find(|document| document.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("document {id} not found"))?;
        let detail = self.faker.document_detail(&document);
        let files = document
            .tracking_number
            .iter()
            .map(|tracking| AttachedFile {
                filename: Some(format!("{tracking}.pdf")),
                from_office: document.originating_office.clone(),
            })
            .collect();
        Ok(DocumentView { detail, files })
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<ApiOutcome<()>> {
        let before = self.documents.len();
        self.documents.retain(|document| document.id != id);
        if self.documents.len() == before {
            return Ok(ApiOutcome::GeneralError("Document not found.".to_owned()));
        }
        Ok(ApiOutcome::Success(()))
    }

    fn load_document_dropdowns(&mut self) -> Result<DocumentDropdowns> {
        Ok(dts_testkit::dropdowns())
    }

    fn submit_form(
        &mut self,
        payload: &FormPayload,
        action: SubmitAction,
    ) -> Result<ApiOutcome<()>> {
        let outcome = match payload {
            FormPayload::AddDocument(form) => self.add_document(form, action),
            FormPayload::RegisterUser(form) => self.register_user(form),
            FormPayload::AssignQr(form) => self.assign_qr_series(form),
        };
        Ok(outcome)
    }

    fn print_qr_series(&mut self, series: &str, office: &str) -> Result<QrSeriesPrint> {
        let record = self
            .office_series(office)
            .iter()
            .find(|record| record.series.as_deref() == Some(series))
            .cloned()
            .ok_or_else(|| anyhow!("QR series {series} not found for {office}"))?;
        Ok(QrSeriesPrint {
            series: record.series,
            office: record.office,
            for_month_year: record.for_month_year,
            initial_count: record.initial_count,
            remaining: record.remaining,
            used: record.used,
        })
    }

    fn base_url(&self) -> &str {
        DEMO_BASE_URL
    }
}
