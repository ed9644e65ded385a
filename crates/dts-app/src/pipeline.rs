// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt::Debug;

use crate::ids::RowId;
use crate::model::SortDirection;

/// A record that can flow through the filter and sort stages of a list screen.
///
/// Rows are opaque apart from their identity and the text of the fields a
/// screen searches or sorts by. `field_text` must be total: missing values
/// come back as the empty string and numbers as their decimal text.
pub trait ListRow {
    type Field: Copy + Eq + Debug + 'static;

    fn row_id(&self) -> RowId;

    fn field_text(&self, field: Self::Field) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + Eq> SortKey<F> {
    pub const fn ascending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Same field flips the direction; a different field starts ascending.
    pub fn toggled(current: Option<Self>, field: F) -> Self {
        match current {
            Some(key) if key.field == field => Self {
                field,
                direction: key.direction.toggled(),
            },
            _ => Self::ascending(field),
        }
    }
}

pub fn matches_query<R: ListRow>(row: &R, needle: &str, fields: &[R::Field]) -> bool {
    needle.is_empty()
        || fields
            .iter()
            .any(|field| row.field_text(*field).to_lowercase().contains(needle))
}

/// Rows where any of `fields` contains `query`, ignoring case. Input order is kept.
pub fn filter_rows<'a, R: ListRow>(rows: &'a [R], query: &str, fields: &[R::Field]) -> Vec<&'a R> {
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| matches_query(*row, &needle, fields))
        .collect()
}

/// Stable sort by case-folded field text. Plain lexicographic order, so "10"
/// lands before "2".
pub fn sort_rows<R: ListRow>(rows: &mut [&R], key: Option<SortKey<R::Field>>) {
    let Some(key) = key else {
        return;
    };
    let mut keyed: Vec<(String, &R)> = rows
        .iter()
        .map(|row| (row.field_text(key.field).to_lowercase(), *row))
        .collect();
    keyed.sort_by(|left, right| {
        let ordering = left.0.cmp(&right.0);
        match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
}
