// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenKind {
    Dashboard,
    Documents,
    Users,
    QrSeries,
}

impl ScreenKind {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Documents, Self::Users, Self::QrSeries];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Documents => "my documents",
            Self::Users => "users",
            Self::QrSeries => "qr series",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Documents => "documents",
            Self::Users => "users",
            Self::QrSeries => "qr",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dashboard" => Some(Self::Dashboard),
            "documents" => Some(Self::Documents),
            "users" => Some(Self::Users),
            "qr" => Some(Self::QrSeries),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserLevel {
    SuperAdmin,
    Admin,
    User,
}

impl UserLevel {
    pub const ALL: [Self; 3] = [Self::SuperAdmin, Self::Admin, Self::User];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Super Admin" => Some(Self::SuperAdmin),
            "Admin" => Some(Self::Admin),
            "User" => Some(Self::User),
            _ => None,
        }
    }
}

/// Where the server asks the client to land after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginRedirect {
    Home,
    MayorsPage,
}

impl LoginRedirect {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("mayors_page") => Self::MayorsPage,
            _ => Self::Home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default, deserialize_with = "loose_text")]
    pub doc_title: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub tracking_number: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub originating_office: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub latest_transaction: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetail {
    #[serde(default, deserialize_with = "loose_text")]
    pub tracking_number: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub doc_title: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub doc_type: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub doc_subject: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub originating_office: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedFile {
    #[serde(default, deserialize_with = "loose_text")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub from_office: Option<String>,
}

impl AttachedFile {
    pub fn url(&self, base_url: &str) -> Option<String> {
        let filename = self.filename.as_deref().filter(|name| !name.is_empty())?;
        let office = self.from_office.as_deref().unwrap_or_default();
        Some(format!(
            "{}/files/{}/{}",
            base_url.trim_end_matches('/'),
            office,
            filename
        ))
    }
}

/// A document detail together with its attachments, fetched for the view overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub detail: DocumentDetail,
    pub files: Vec<AttachedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    #[serde(default, deserialize_with = "loose_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub office_dept: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub active: Option<String>,
}

impl UserAccount {
    pub fn is_active(&self) -> bool {
        self.active.as_deref() == Some("1")
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active() {
            "Active"
        } else {
            "Inactive"
        }
    }

    pub fn designation_label(&self) -> &str {
        match self.designation.as_deref() {
            Some(value) if !value.is_empty() => value,
            _ => "N/A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrSeries {
    #[serde(default, deserialize_with = "loose_text")]
    pub series: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub office: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub for_month_year: Option<String>,
    #[serde(default, deserialize_with = "loose_count")]
    pub initial_count: Option<i64>,
    #[serde(default, deserialize_with = "loose_count")]
    pub remaining: Option<i64>,
    #[serde(default, deserialize_with = "loose_count")]
    pub used: Option<i64>,
}

/// Single-series summary returned by the print endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrSeriesPrint {
    #[serde(default, deserialize_with = "loose_text")]
    pub series: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub office: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub for_month_year: Option<String>,
    #[serde(default, deserialize_with = "loose_count")]
    pub initial_count: Option<i64>,
    #[serde(default, deserialize_with = "loose_count")]
    pub remaining: Option<i64>,
    #[serde(default, deserialize_with = "loose_count")]
    pub used: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    #[serde(default, deserialize_with = "loose_text")]
    pub dept_description: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dept_code: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub dept_floor: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub tag: Option<String>,
}

impl Department {
    pub fn code(&self) -> &str {
        self.dept_code.as_deref().unwrap_or_default()
    }

    pub fn label(&self) -> &str {
        match self.dept_description.as_deref() {
            Some(description) if !description.is_empty() => description,
            _ => self.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocType {
    pub id: DocTypeId,
    #[serde(default, deserialize_with = "loose_text")]
    pub doc_type: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSubject {
    pub id: DocSubjectId,
    #[serde(default, deserialize_with = "loose_text")]
    pub doc_subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocumentDropdowns {
    #[serde(default)]
    pub doctypes: Vec<DocType>,
    #[serde(default)]
    pub docsubj: Vec<DocSubject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardCounts {
    #[serde(default, deserialize_with = "loose_total")]
    pub released: u64,
    #[serde(default, deserialize_with = "loose_total")]
    pub pending: u64,
    #[serde(default, deserialize_with = "loose_total")]
    pub incoming: u64,
    #[serde(default, deserialize_with = "loose_total")]
    pub received: u64,
    #[serde(default, deserialize_with = "loose_total")]
    pub draft: u64,
    #[serde(default, deserialize_with = "loose_total")]
    pub terminal: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CurrentUser {
    #[serde(default, deserialize_with = "loose_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub office_dept: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub user_level: Option<String>,
}

/// Dashboard screen payload: counts plus the signed-in user, when known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardSnapshot {
    pub counts: DashboardCounts,
    pub user: Option<CurrentUser>,
}

/// Accepts any JSON scalar and keeps its text form; `null` and absent become `None`.
pub fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }))
}

/// Numbers or numeric strings; anything else reads as absent.
pub fn loose_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}

fn loose_total<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let count = loose_count(deserializer)?;
    Ok(count.and_then(|count| u64::try_from(count).ok()).unwrap_or(0))
}
