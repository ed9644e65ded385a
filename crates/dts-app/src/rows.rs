// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RowId;
use crate::model::{Document, QrSeries, UserAccount};
use crate::pipeline::ListRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentField {
    Id,
    Title,
    TrackingNumber,
    OriginatingOffice,
    LatestTransaction,
    Status,
}

impl DocumentField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Title,
        Self::TrackingNumber,
        Self::OriginatingOffice,
        Self::LatestTransaction,
        Self::Status,
    ];

    /// Columns the documents screen lists and sorts by.
    pub const COLUMNS: [Self; 5] = [
        Self::TrackingNumber,
        Self::Title,
        Self::OriginatingOffice,
        Self::LatestTransaction,
        Self::Status,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "Title",
            Self::TrackingNumber => "Tracking No.",
            Self::OriginatingOffice => "Origin",
            Self::LatestTransaction => "Latest",
            Self::Status => "Status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Name,
    OfficeDept,
    Designation,
    Username,
    Status,
}

impl UserField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::OfficeDept,
        Self::Designation,
        Self::Username,
        Self::Status,
    ];

    pub const COLUMNS: [Self; 5] = [
        Self::Name,
        Self::OfficeDept,
        Self::Designation,
        Self::Username,
        Self::Status,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::OfficeDept => "Office",
            Self::Designation => "Designation",
            Self::Username => "Username",
            Self::Status => "Status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrSeriesField {
    Office,
    Month,
    Series,
    InitialCount,
    Remaining,
    Used,
}

impl QrSeriesField {
    pub const ALL: [Self; 6] = [
        Self::Office,
        Self::Month,
        Self::Series,
        Self::InitialCount,
        Self::Remaining,
        Self::Used,
    ];

    pub const COLUMNS: [Self; 6] = Self::ALL;

    pub const fn label(self) -> &'static str {
        match self {
            Self::Office => "Office",
            Self::Month => "Month",
            Self::Series => "Series",
            Self::InitialCount => "Initial",
            Self::Remaining => "Remaining",
            Self::Used => "Used",
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn count(value: Option<i64>) -> String {
    value.map(|count| count.to_string()).unwrap_or_default()
}

impl ListRow for Document {
    type Field = DocumentField;

    fn row_id(&self) -> RowId {
        self.id.into()
    }

    fn field_text(&self, field: DocumentField) -> String {
        match field {
            DocumentField::Id => self.id.to_string(),
            DocumentField::Title => text(&self.doc_title),
            DocumentField::TrackingNumber => text(&self.tracking_number),
            DocumentField::OriginatingOffice => text(&self.originating_office),
            DocumentField::LatestTransaction => text(&self.latest_transaction),
            DocumentField::Status => text(&self.status),
        }
    }
}

impl ListRow for UserAccount {
    type Field = UserField;

    fn row_id(&self) -> RowId {
        self.id.into()
    }

    fn field_text(&self, field: UserField) -> String {
        match field {
            UserField::Id => self.id.to_string(),
            UserField::Name => text(&self.name),
            UserField::OfficeDept => text(&self.office_dept),
            UserField::Designation => text(&self.designation),
            UserField::Username => text(&self.username),
            UserField::Status => self.status_label().to_owned(),
        }
    }
}

impl ListRow for QrSeries {
    type Field = QrSeriesField;

    fn row_id(&self) -> RowId {
        RowId::Text(text(&self.series))
    }

    fn field_text(&self, field: QrSeriesField) -> String {
        match field {
            QrSeriesField::Office => text(&self.office),
            QrSeriesField::Month => text(&self.for_month_year),
            QrSeriesField::Series => text(&self.series),
            QrSeriesField::InitialCount => count(self.initial_count),
            QrSeriesField::Remaining => count(self.remaining),
            QrSeriesField::Used => count(self.used),
        }
    }
}
