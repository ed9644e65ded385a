// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use dts_app::{
    CurrentUser, DashboardCounts, DashboardSnapshot, Department, DepartmentId, DocSubject,
    DocSubjectId, DocType, DocTypeId, Document, DocumentDetail, DocumentDropdowns, DocumentId,
    QrSeries, UserAccount, UserId, UserLevel,
};
use std::collections::BTreeMap;
use time::{Date, Month};

const OFFICES: [(&str, &str, &str); 10] = [
    ("MO", "Office of the City Mayor", "3F"),
    ("VMO", "Office of the City Vice Mayor", "3F"),
    ("CTO", "City Treasurer's Office", "1F"),
    ("CAO", "City Accounting Office", "2F"),
    ("CBO", "City Budget Office", "2F"),
    ("CEO", "City Engineering Office", "4F"),
    ("HRMO", "Human Resource Management Office", "2F"),
    ("ICTO", "Information and Communications Technology Office", "5F"),
    ("CLO", "City Legal Office", "3F"),
    ("GSO", "General Services Office", "1F"),
];

const DOC_TYPES: [(&str, &str); 6] = [
    ("MEMO", "Memorandum"),
    ("LTR", "Letter"),
    ("PR", "Purchase Request"),
    ("DV", "Disbursement Voucher"),
    ("ORD", "Ordinance"),
    ("RES", "Resolution"),
];

const DOC_SUBJECTS: [&str; 8] = [
    "Budget Allocation",
    "Procurement",
    "Personnel Action",
    "Travel Authority",
    "Infrastructure Project",
    "Public Advisory",
    "Payroll",
    "Inventory",
];

const TITLE_PREFIXES: [&str; 8] = [
    "Request for",
    "Approval of",
    "Endorsement of",
    "Notice of",
    "Submission of",
    "Review of",
    "Release of",
    "Transmittal of",
];

const STATUSES: [&str; 5] = ["Draft", "Pending", "Released", "Received", "Terminal"];

const TRANSACTIONS: [&str; 5] = [
    "Created",
    "Forwarded",
    "Received",
    "Returned",
    "Archived",
];

const FIRST_NAMES: [&str; 16] = [
    "Ana", "Ben", "Carla", "Dante", "Elena", "Felix", "Grace", "Hector", "Isabel", "Jose",
    "Karen", "Luis", "Maria", "Noel", "Olivia", "Paolo",
];

const LAST_NAMES: [&str; 14] = [
    "Reyes", "Santos", "Cruz", "Bautista", "Garcia", "Mendoza", "Torres", "Flores", "Ramos",
    "Aquino", "Castillo", "Villanueva", "Navarro", "Dela Cruz",
];

const DESIGNATIONS: [&str; 7] = [
    "Administrative Aide",
    "Clerk",
    "Records Officer",
    "Budget Officer",
    "Engineer II",
    "Department Head",
    "",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible city-hall records.
#[derive(Debug, Clone)]
pub struct OfficeFaker {
    rng: DeterministicRng,
}

impl OfficeFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn document(&mut self, id: i64) -> Document {
        let office = self.pick_office();
        Document {
            id: DocumentId::new(id),
            doc_title: Some(self.title()),
            tracking_number: Some(tracking_number(id)),
            originating_office: Some(office.0.to_owned()),
            latest_transaction: Some(self.pick(&TRANSACTIONS).to_owned()),
            status: Some(self.pick(&STATUSES).to_owned()),
        }
    }

    pub fn documents(&mut self, count: usize) -> Vec<Document> {
        (1..=count as i64).map(|id| self.document(id)).collect()
    }

    pub fn document_detail(&mut self, document: &Document) -> DocumentDetail {
        let (type_code, type_name) = DOC_TYPES[self.rng.int_n(DOC_TYPES.len())];
        DocumentDetail {
            tracking_number: document.tracking_number.clone(),
            doc_title: document.doc_title.clone(),
            doc_type: Some(type_name.to_owned()),
            doc_subject: Some(self.pick(&DOC_SUBJECTS).to_owned()),
            originating_office: document.originating_office.clone(),
            remarks: Some(format!("Routed as {type_code}")),
            status: document.status.clone(),
            extra: BTreeMap::new(),
        }
    }

    pub fn user(&mut self, id: i64) -> UserAccount {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let office = self.pick_office();
        let designation = self.pick(&DESIGNATIONS);
        UserAccount {
            id: UserId::new(id),
            name: Some(format!("{first} {last}")),
            office_dept: Some(office.0.to_owned()),
            designation: (!designation.is_empty()).then(|| designation.to_owned()),
            username: Some(username(first, last, id)),
            active: Some(if self.rng.int_n(5) == 0 { "0" } else { "1" }.to_owned()),
        }
    }

    pub fn users(&mut self, count: usize) -> Vec<UserAccount> {
        (1..=count as i64).map(|id| self.user(id)).collect()
    }

    pub fn qr_series(&mut self, office: &str, count: usize) -> Vec<QrSeries> {
        (0..count)
            .map(|index| {
                let initial = 50 + (self.rng.int_n(10) as i64) * 25;
                let used = self.rng.int_n(initial as usize + 1) as i64;
                let month = month_label(index);
                QrSeries {
                    series: Some(format!("{office}-{month}-{:03}", index + 1)),
                    office: Some(office.to_owned()),
                    for_month_year: Some(month),
                    initial_count: Some(initial),
                    remaining: Some(initial - used),
                    used: Some(used),
                }
            })
            .collect()
    }

    pub fn dashboard(&mut self) -> DashboardSnapshot {
        DashboardSnapshot {
            counts: DashboardCounts {
                released: self.rng.int_n(40) as u64,
                pending: self.rng.int_n(40) as u64,
                incoming: self.rng.int_n(20) as u64,
                received: self.rng.int_n(60) as u64,
                draft: self.rng.int_n(10) as u64,
                terminal: self.rng.int_n(15) as u64,
            },
            user: Some(CurrentUser {
                name: Some("Demo Administrator".to_owned()),
                username: Some("demo".to_owned()),
                office_dept: Some("ICTO".to_owned()),
                user_level: Some(UserLevel::SuperAdmin.as_str().to_owned()),
            }),
        }
    }

    fn title(&mut self) -> String {
        format!(
            "{} {}",
            self.pick(&TITLE_PREFIXES),
            self.pick(&DOC_SUBJECTS)
        )
    }

    fn pick_office(&mut self) -> (&'static str, &'static str, &'static str) {
        OFFICES[self.rng.int_n(OFFICES.len())]
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn departments() -> Vec<Department> {
    OFFICES
        .iter()
        .enumerate()
        .map(|(index, (code, description, floor))| Department {
            id: DepartmentId::new(index as i64 + 1),
            dept_description: Some((*description).to_owned()),
            dept_code: Some((*code).to_owned()),
            dept_floor: Some((*floor).to_owned()),
            tag: None,
        })
        .collect()
}

pub fn dropdowns() -> DocumentDropdowns {
    DocumentDropdowns {
        doctypes: DOC_TYPES
            .iter()
            .enumerate()
            .map(|(index, (code, name))| DocType {
                id: DocTypeId::new(index as i64 + 1),
                doc_type: Some((*name).to_owned()),
                code: Some((*code).to_owned()),
            })
            .collect(),
        docsubj: DOC_SUBJECTS
            .iter()
            .enumerate()
            .map(|(index, subject)| DocSubject {
                id: DocSubjectId::new(index as i64 + 1),
                doc_subject: Some((*subject).to_owned()),
            })
            .collect(),
    }
}

pub fn office_codes() -> Vec<&'static str> {
    OFFICES.iter().map(|(code, _, _)| *code).collect()
}

pub fn tracking_number(id: i64) -> String {
    format!("SJC-{REFERENCE_YEAR}-{id:05}")
}

/// `YYYY-MM` for the month `offset` months after January of the reference year.
pub fn month_label(offset: usize) -> String {
    let year = REFERENCE_YEAR + (offset / 12) as i32;
    let month = Month::try_from((offset % 12) as u8 + 1).unwrap_or(Month::January);
    match Date::from_calendar_date(year, month, 1) {
        Ok(date) => format!("{:04}-{:02}", date.year(), u8::from(date.month())),
        Err(_) => format!("{REFERENCE_YEAR}-01"),
    }
}

fn username(first: &str, last: &str, id: i64) -> String {
    let initial = first.chars().next().unwrap_or('x');
    let surname: String = last
        .chars()
        .filter(|ch| ch.is_ascii_alphabetic())
        .collect();
    format!("{initial}{surname}{id}").to_lowercase()
}
