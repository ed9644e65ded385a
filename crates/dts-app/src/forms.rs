// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;

use crate::outcome::FieldErrors;

/// Value sent for a picker nobody touched.
pub const UNSELECTED: &str = "----";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddDocument,
    RegisterUser,
    AssignQr,
}

impl FormKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::AddDocument => "Add document",
            Self::RegisterUser => "Register user",
            Self::AssignQr => "Assign QR series",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    Text,
    Secret,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub input: FieldInput,
}

const fn text(key: &'static str, label: &'static str) -> FormField {
    FormField {
        key,
        label,
        input: FieldInput::Text,
    }
}

const fn secret(key: &'static str, label: &'static str) -> FormField {
    FormField {
        key,
        label,
        input: FieldInput::Secret,
    }
}

const fn choice(key: &'static str, label: &'static str) -> FormField {
    FormField {
        key,
        label,
        input: FieldInput::Choice,
    }
}

/// `status` sent with a new document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Submit,
    Draft,
}

impl SubmitAction {
    pub const fn status_code(self) -> u8 {
        match self {
            Self::Submit => 1,
            Self::Draft => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDocumentForm {
    pub doctitle: String,
    pub doctype: String,
    pub docsubj: String,
    pub urgency: String,
    pub remarks: String,
}

impl Default for AddDocumentForm {
    fn default() -> Self {
        Self {
            doctitle: String::new(),
            doctype: UNSELECTED.to_owned(),
            docsubj: UNSELECTED.to_owned(),
            urgency: String::new(),
            remarks: String::new(),
        }
    }
}

impl AddDocumentForm {
    pub const FIELDS: &'static [FormField] = &[
        text("doctitle", "Title"),
        choice("doctype", "Document type"),
        choice("docsubj", "Subject"),
        text("urgency", "Urgency"),
        text("remarks", "Remarks"),
    ];

    /// Copy with surrounding whitespace removed, as sent to the server.
    pub fn trimmed(&self) -> Self {
        Self {
            doctitle: self.doctitle.trim().to_owned(),
            doctype: self.doctype.clone(),
            docsubj: self.docsubj.clone(),
            urgency: self.urgency.trim().to_owned(),
            remarks: self.remarks.trim().to_owned(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "doctitle" => &self.doctitle,
            "doctype" => &self.doctype,
            "docsubj" => &self.docsubj,
            "urgency" => &self.urgency,
            "remarks" => &self.remarks,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn slot(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "doctitle" => Some(&mut self.doctitle),
            "doctype" => Some(&mut self.doctype),
            "docsubj" => Some(&mut self.docsubj),
            "urgency" => Some(&mut self.urgency),
            "remarks" => Some(&mut self.remarks),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserForm {
    pub name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    pub office_dept: String,
    pub designation: String,
    pub contact: String,
    pub username: String,
    pub user_level: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Default for RegisterUserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            suffix: String::new(),
            office_dept: UNSELECTED.to_owned(),
            designation: String::new(),
            contact: String::new(),
            username: String::new(),
            user_level: UNSELECTED.to_owned(),
            password: String::new(),
            password_confirmation: String::new(),
        }
    }
}

impl RegisterUserForm {
    pub const FIELDS: &'static [FormField] = &[
        text("name", "First name"),
        text("middle_name", "Middle name"),
        text("last_name", "Last name"),
        text("suffix", "Suffix"),
        choice("office_dept", "Office"),
        text("designation", "Designation"),
        text("contact", "Contact number"),
        text("username", "Username"),
        choice("user_level", "User level"),
        secret("password", "Password"),
        secret("password_confirmation", "Confirm password"),
    ];

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let required = [
            ("name", &self.name, "First name is required."),
            ("last_name", &self.last_name, "Last name is required."),
            ("designation", &self.designation, "Designation is required."),
            ("contact", &self.contact, "Contact number is required."),
            ("username", &self.username, "Username is required."),
            ("password", &self.password, "Password is required."),
        ];
        for (field, value, message) in required {
            if value.is_empty() {
                errors.push(field, message);
            }
        }
        if self.password != self.password_confirmation {
            errors.push(
                "password_confirmation",
                "The password confirmation does not match.",
            );
        } else if self.password_confirmation.is_empty() {
            errors.push("password_confirmation", "Please confirm your password.");
        }
        errors.into_result()
    }

    fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "name" => &self.name,
            "middle_name" => &self.middle_name,
            "last_name" => &self.last_name,
            "suffix" => &self.suffix,
            "office_dept" => &self.office_dept,
            "designation" => &self.designation,
            "contact" => &self.contact,
            "username" => &self.username,
            "user_level" => &self.user_level,
            "password" => &self.password,
            "password_confirmation" => &self.password_confirmation,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn slot(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "middle_name" => Some(&mut self.middle_name),
            "last_name" => Some(&mut self.last_name),
            "suffix" => Some(&mut self.suffix),
            "office_dept" => Some(&mut self.office_dept),
            "designation" => Some(&mut self.designation),
            "contact" => Some(&mut self.contact),
            "username" => Some(&mut self.username),
            "user_level" => Some(&mut self.user_level),
            "password" => Some(&mut self.password),
            "password_confirmation" => Some(&mut self.password_confirmation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignQrForm {
    pub selected_office: String,
    pub amount: String,
    pub for_month_year: String,
}

impl AssignQrForm {
    pub const FIELDS: &'static [FormField] = &[
        choice("selected_office", "Office"),
        text("amount", "Amount"),
        text("for_month_year", "Month (YYYY-MM)"),
    ];

    pub fn for_office(office: &str) -> Self {
        Self {
            selected_office: office.to_owned(),
            ..Self::default()
        }
    }

    pub fn amount_value(&self) -> Option<i64> {
        self.amount.trim().parse().ok().filter(|amount| *amount > 0)
    }

    pub fn month(&self) -> Option<Date> {
        let value = format!("{}-01", self.for_month_year.trim());
        Date::parse(&value, format_description!("[year]-[month]-[day]")).ok()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = [
            ("selected_office", &self.selected_office),
            ("amount", &self.amount),
            ("for_month_year", &self.for_month_year),
        ];
        let mut missing = false;
        for (field, value) in fields {
            if value.trim().is_empty() || value == UNSELECTED {
                errors.push(field, "Please fill all the fields.");
                missing = true;
            }
        }
        if !missing {
            if self.amount_value().is_none() {
                errors.push("amount", "Amount must be a positive whole number.");
            }
            if self.month().is_none() {
                errors.push("for_month_year", "Month must look like 2026-10.");
            }
        }
        errors.into_result()
    }

    fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "selected_office" => &self.selected_office,
            "amount" => &self.amount,
            "for_month_year" => &self.for_month_year,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn slot(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "selected_office" => Some(&mut self.selected_office),
            "amount" => Some(&mut self.amount),
            "for_month_year" => Some(&mut self.for_month_year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    AddDocument(AddDocumentForm),
    RegisterUser(RegisterUserForm),
    AssignQr(AssignQrForm),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::AddDocument(_) => FormKind::AddDocument,
            Self::RegisterUser(_) => FormKind::RegisterUser,
            Self::AssignQr(_) => FormKind::AssignQr,
        }
    }

    pub fn blank_for(kind: FormKind) -> Self {
        match kind {
            FormKind::AddDocument => Self::AddDocument(AddDocumentForm::default()),
            FormKind::RegisterUser => Self::RegisterUser(RegisterUserForm::default()),
            FormKind::AssignQr => Self::AssignQr(AssignQrForm::default()),
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self {
            Self::AddDocument(_) => AddDocumentForm::FIELDS,
            Self::RegisterUser(_) => RegisterUserForm::FIELDS,
            Self::AssignQr(_) => AssignQrForm::FIELDS,
        }
    }

    pub fn value(&self, key: &str) -> &str {
        let value = match self {
            Self::AddDocument(form) => form.get(key),
            Self::RegisterUser(form) => form.get(key),
            Self::AssignQr(form) => form.get(key),
        };
        value.unwrap_or_default()
    }

    /// Unknown keys are ignored.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        if let Some(slot) = self.slot(key) {
            *slot = value.into();
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            Self::AddDocument(_) => Ok(()),
            Self::RegisterUser(form) => form.validate(),
            Self::AssignQr(form) => form.validate(),
        }
    }

    fn slot(&mut self, key: &str) -> Option<&mut String> {
        match self {
            Self::AddDocument(form) => form.slot(key),
            Self::RegisterUser(form) => form.slot(key),
            Self::AssignQr(form) => form.slot(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AddDocumentForm, AssignQrForm, FieldInput, FormKind, FormPayload, RegisterUserForm,
        SubmitAction, UNSELECTED,
    };

    fn complete_registration() -> RegisterUserForm {
        RegisterUserForm {
            name: "Ana".to_owned(),
            last_name: "Reyes".to_owned(),
            designation: "Clerk".to_owned(),
            contact: "09170000000".to_owned(),
            username: "areyes".to_owned(),
            user_level: "User".to_owned(),
            password: "secret123".to_owned(),
            password_confirmation: "secret123".to_owned(),
            ..RegisterUserForm::default()
        }
    }

    #[test]
    fn blank_forms_start_with_unselected_pickers() {
        let FormPayload::AddDocument(form) = FormPayload::blank_for(FormKind::AddDocument) else {
            panic!("expected add-document payload");
        };
        assert_eq!(form.doctype, UNSELECTED);
        assert_eq!(form.docsubj, UNSELECTED);
        assert_eq!(RegisterUserForm::default().office_dept, UNSELECTED);
    }

    #[test]
    fn add_document_trims_text_but_not_pickers() {
        let form = AddDocumentForm {
            doctitle: "  Budget memo ".to_owned(),
            urgency: " high ".to_owned(),
            remarks: "\tfor review\n".to_owned(),
            ..AddDocumentForm::default()
        };
        let trimmed = form.trimmed();
        assert_eq!(trimmed.doctitle, "Budget memo");
        assert_eq!(trimmed.urgency, "high");
        assert_eq!(trimmed.remarks, "for review");
        assert_eq!(trimmed.doctype, UNSELECTED);
        assert_eq!(SubmitAction::Submit.status_code(), 1);
        assert_eq!(SubmitAction::Draft.status_code(), 2);
    }

    #[test]
    fn registration_requires_core_fields() {
        let Err(errors) = RegisterUserForm::default().validate() else {
            panic!("blank registration should fail");
        };
        assert_eq!(errors.first("name"), Some("First name is required."));
        assert_eq!(errors.first("last_name"), Some("Last name is required."));
        assert_eq!(errors.first("contact"), Some("Contact number is required."));
        assert_eq!(
            errors.first("password_confirmation"),
            Some("Please confirm your password.")
        );
        assert!(errors.get("middle_name").is_empty());
        assert!(complete_registration().validate().is_ok());
    }

    #[test]
    fn registration_mismatch_wins_over_missing_confirmation() {
        let form = RegisterUserForm {
            password_confirmation: String::new(),
            ..complete_registration()
        };
        let Err(errors) = form.validate() else {
            panic!("mismatch should fail");
        };
        assert_eq!(
            errors.get("password_confirmation"),
            ["The password confirmation does not match."]
        );
    }

    #[test]
    fn qr_assignment_checks_presence_then_shape() {
        let Err(errors) = AssignQrForm::for_office("ICTO").validate() else {
            panic!("blank amount should fail");
        };
        assert_eq!(errors.first("amount"), Some("Please fill all the fields."));
        assert!(errors.get("selected_office").is_empty());

        let bad = AssignQrForm {
            selected_office: "ICTO".to_owned(),
            amount: "-3".to_owned(),
            for_month_year: "October".to_owned(),
        };
        let Err(errors) = bad.validate() else {
            panic!("bad values should fail");
        };
        assert_eq!(errors.len(), 2);

        let good = AssignQrForm {
            selected_office: "ICTO".to_owned(),
            amount: "25".to_owned(),
            for_month_year: "2026-10".to_owned(),
        };
        assert!(good.validate().is_ok());
        assert_eq!(good.amount_value(), Some(25));
    }

    #[test]
    fn payload_reads_and_writes_fields_by_key() {
        let mut payload = FormPayload::blank_for(FormKind::RegisterUser);
        payload.set_value("username", "bsantos");
        payload.set_value("nonexistent", "ignored");
        assert_eq!(payload.value("username"), "bsantos");
        assert_eq!(payload.value("nonexistent"), "");
        assert_eq!(payload.value("office_dept"), UNSELECTED);

        let secrets: Vec<&str> = payload
            .fields()
            .iter()
            .filter(|field| field.input == FieldInput::Secret)
            .map(|field| field.key)
            .collect();
        assert_eq!(secrets, ["password", "password_confirmation"]);
    }

    #[test]
    fn every_declared_field_is_addressable() {
        for kind in [FormKind::AddDocument, FormKind::RegisterUser, FormKind::AssignQr] {
            let mut payload = FormPayload::blank_for(kind);
            for field in payload.fields() {
                payload.set_value(field.key, format!("v-{}", field.key));
                assert_eq!(payload.value(field.key), format!("v-{}", field.key));
            }
        }
    }
}
