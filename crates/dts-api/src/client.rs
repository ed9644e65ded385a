// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use dts_app::{
    AddDocumentForm, ApiOutcome, AssignQrForm, AttachedFile, CurrentUser, DashboardCounts,
    Department, Document, DocumentDetail, DocumentDropdowns, DocumentId, LoginRedirect, QrSeries,
    QrSeriesPrint, RegisterUserForm, SubmitAction, UserAccount,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::normalize::{embedded_field_errors, error_outcome, server_error};
use crate::transport::{ApiPath, RawResponse, Transport};

/// One page of the user directory as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPage {
    pub users: Vec<UserAccount>,
    pub total_pages: u64,
}

/// Typed Document Tracking System endpoints over an injected [`Transport`].
#[derive(Debug, Clone)]
pub struct Api<T: Transport> {
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn is_signed_in(&self) -> ApiResult<bool> {
        let token = self
            .transport
            .tokens()
            .load()
            .map_err(|error| ApiError::TokenStore(format!("{error:#}")))?;
        Ok(token.is_some())
    }

    pub fn login(&self, username: &str, password: &str) -> ApiResult<ApiOutcome<LoginRedirect>> {
        if username.is_empty() || password.is_empty() {
            return Ok(ApiOutcome::GeneralError(
                "Please enter both username and password.".to_owned(),
            ));
        }

        let path = ApiPath::new("api/login");
        let body = json!({ "username": username, "password": password });
        let response = self.transport.post_anonymous(&path, &body)?;
        if !response.is_success() {
            return Ok(ApiOutcome::GeneralError(
                "incorrect username or password".to_owned(),
            ));
        }

        let login: LoginResponse = match response.json(&path) {
            Ok(login) => login,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "login reply is not the expected JSON");
                LoginResponse::default()
            }
        };
        let Some(token) = login.access_token.filter(|token| !token.is_empty()) else {
            return Ok(ApiOutcome::GeneralError(
                "login failed: no token received".to_owned(),
            ));
        };
        self.transport
            .tokens()
            .save(&token)
            .map_err(|error| ApiError::TokenStore(format!("{error:#}")))?;
        info!(username, "signed in");
        Ok(ApiOutcome::Success(LoginRedirect::parse(
            login.redirect_to.as_deref(),
        )))
    }

    pub fn logout(&self) -> ApiResult<()> {
        let path = ApiPath::new("api/logout");
        let response = self.transport.post_json(&path, &json!({}))?;
        if !response.is_success() {
            return Err(server_error(response.status, &response.body));
        }
        self.transport
            .tokens()
            .clear()
            .map_err(|error| ApiError::TokenStore(format!("{error:#}")))?;
        info!("signed out");
        Ok(())
    }

    pub fn dashboard_counts(&self) -> ApiResult<DashboardCounts> {
        self.get_json(&ApiPath::new("api/home"))
    }

    pub fn current_user(&self) -> ApiResult<CurrentUser> {
        self.get_json(&ApiPath::new("api/user"))
    }

    pub fn my_documents(&self) -> ApiResult<Vec<Document>> {
        let path = ApiPath::new("api/my-documents-list");
        let value: Value = self.get_json(&path)?;
        match value.get("data") {
            Some(data @ Value::Array(_)) => decode_value(&path, data.clone()),
            _ => Err(ApiError::unexpected(&path, "expected `data` to be a list")),
        }
    }

    pub fn document_detail(&self, id: DocumentId) -> ApiResult<DocumentDetail> {
        let path = ApiPath::new("api/my-docs-view").push(id);
        let envelope: DataEnvelope<DocumentDetail> = self.get_json(&path)?;
        envelope
            .data
            .ok_or_else(|| ApiError::unexpected(&path, "missing `data`"))
    }

    pub fn attached_files(&self, id: DocumentId) -> ApiResult<Vec<AttachedFile>> {
        let path = ApiPath::new("api/attached-files").push(id);
        let envelope: DataEnvelope<Vec<AttachedFile>> = self.get_json(&path)?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub fn delete_document(&self, id: DocumentId) -> ApiResult<ApiOutcome<()>> {
        let path = ApiPath::new("api/delete-doc").push(id);
        let response = self.transport.delete(&path)?;
        if !response.is_success() {
            return Ok(error_outcome(response.status, &response.body));
        }
        info!(document = %id, "document deleted");
        Ok(ApiOutcome::Success(()))
    }

    pub fn document_dropdowns(&self) -> ApiResult<DocumentDropdowns> {
        self.get_json(&ApiPath::new("api/my_documents"))
    }

    pub fn add_document(
        &self,
        form: &AddDocumentForm,
        action: SubmitAction,
    ) -> ApiResult<ApiOutcome<()>> {
        let form = form.trimmed();
        let body = json!({
            "doctitle": form.doctitle,
            "doctype": form.doctype,
            "docsubj": form.docsubj,
            "urgency": form.urgency,
            "remarks": form.remarks,
            "status": action.status_code(),
        });
        self.submit(&ApiPath::new("api/save-add-doc"), &body)
    }

    pub fn list_users(&self) -> ApiResult<UserPage> {
        let envelope: UserListEnvelope = self.get_json(&ApiPath::new("api/list-user"))?;
        Ok(UserPage {
            users: envelope.users.unwrap_or_default(),
            total_pages: envelope
                .total_pages
                .and_then(|pages| u64::try_from(pages).ok())
                .filter(|pages| *pages > 0)
                .unwrap_or(1),
        })
    }

    /// Registers an account. Any token in the reply belongs to the new user
    /// and is dropped so the current session stays signed in.
    pub fn register_user(&self, form: &RegisterUserForm) -> ApiResult<ApiOutcome<()>> {
        if let Err(errors) = form.validate() {
            return Ok(ApiOutcome::FieldErrors(errors));
        }
        let body = json!({
            "name": form.name,
            "middle_name": form.middle_name,
            "last_name": form.last_name,
            "suffix": form.suffix,
            "office_dept": form.office_dept,
            "designation": form.designation,
            "contact": form.contact,
            "username": form.username,
            "user_level": form.user_level,
            "password": form.password,
            "password_confirmation": form.password_confirmation,
        });
        self.submit(&ApiPath::new("api/register"), &body)
    }

    pub fn departments(&self) -> ApiResult<Vec<Department>> {
        let path = ApiPath::new("api/department");
        let value: Value = self.get_json(&path)?;
        let records = match value.get("office") {
            Some(Value::Object(map)) => map.values().cloned().collect(),
            Some(Value::Array(items)) => items.clone(),
            _ => return Err(ApiError::unexpected(&path, "expected `office` records")),
        };
        decode_value(&path, Value::Array(records))
    }

    pub fn qr_series(&self, office: &str) -> ApiResult<Vec<QrSeries>> {
        let path = ApiPath::new("api/qr-office-list").push(office);
        let value: Value = self.get_json(&path)?;
        let records = match &value {
            Value::Array(items) => items.clone(),
            Value::Object(object) => match (object.get("data"), object.get("qr"), object.get("records")) {
                (Some(Value::Array(items)), _, _) => items.clone(),
                (_, Some(Value::Object(map)), _) => map.values().cloned().collect(),
                (_, _, Some(Value::Array(items))) => items.clone(),
                _ => return Err(ApiError::unexpected(&path, "unrecognized QR list shape")),
            },
            _ => return Err(ApiError::unexpected(&path, "unrecognized QR list shape")),
        };
        let mut series: Vec<QrSeries> = decode_value(&path, Value::Array(records))?;
        let before = series.len();
        // Rows are keyed by series name; a nameless one cannot be selected or printed.
        series.retain(|record| record.series.as_deref().is_some_and(|name| !name.is_empty()));
        if series.len() < before {
            warn!(%path, skipped = before - series.len(), "QR records without a series name");
        }
        Ok(series)
    }

    pub fn assign_qr_series(&self, form: &AssignQrForm) -> ApiResult<ApiOutcome<()>> {
        if let Err(errors) = form.validate() {
            return Ok(ApiOutcome::FieldErrors(errors));
        }
        let body = json!({
            "selected_office": form.selected_office,
            "amount": form.amount_value(),
            "for_month_year": form.for_month_year.trim(),
        });
        self.submit(&ApiPath::new("api/assign-new-qr-series"), &body)
    }

    pub fn print_qr_series(&self, series: &str, office: &str) -> ApiResult<QrSeriesPrint> {
        let path = ApiPath::new("print-qr-series").push(series).push(office);
        let value: Value = self.get_json(&path)?;
        let record = match value.get("data") {
            Some(data @ Value::Object(_)) => data.clone(),
            _ => value,
        };
        decode_value(&path, record)
    }

    fn get_json<R: DeserializeOwned>(&self, path: &ApiPath) -> ApiResult<R> {
        let response = self.transport.get(path)?;
        expect_success(&response)?;
        response.json(path)
    }

    fn submit(&self, path: &ApiPath, body: &Value) -> ApiResult<ApiOutcome<()>> {
        let response = self.transport.post_json(path, body)?;
        if !response.is_success() {
            return Ok(error_outcome(response.status, &response.body));
        }
        if let Some(errors) = embedded_field_errors(&response.body) {
            return Ok(ApiOutcome::FieldErrors(errors));
        }
        info!(%path, "submitted");
        Ok(ApiOutcome::Success(()))
    }
}

fn expect_success(response: &RawResponse) -> ApiResult<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(server_error(response.status, &response.body))
    }
}

fn decode_value<R: DeserializeOwned>(path: &ApiPath, value: Value) -> ApiResult<R> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    redirect_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<D> {
    data: Option<D>,
}

#[derive(Debug, Deserialize)]
struct UserListEnvelope {
    #[serde(default)]
    users: Option<Vec<UserAccount>>,
    #[serde(default, deserialize_with = "dts_app::loose_count")]
    total_pages: Option<i64>,
}
