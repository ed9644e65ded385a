// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RowId;
use crate::paging::{self, PageLabel};
use crate::pipeline::{ListRow, SortKey, filter_rows, sort_rows};
use crate::rows::{DocumentField, QrSeriesField, UserField};
use crate::selection::Selection;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Per-screen configuration of a [`ListView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSpec<F: 'static> {
    pub search_fields: &'static [F],
    pub page_size: usize,
    pub clear_selection_on_page_change: bool,
}

impl<F: 'static> ListSpec<F> {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl ListSpec<DocumentField> {
    pub const fn documents() -> Self {
        Self {
            search_fields: &DocumentField::ALL,
            page_size: DEFAULT_PAGE_SIZE,
            clear_selection_on_page_change: false,
        }
    }
}

impl ListSpec<UserField> {
    pub const fn users() -> Self {
        Self {
            search_fields: &[
                UserField::Name,
                UserField::OfficeDept,
                UserField::Designation,
                UserField::Username,
            ],
            page_size: DEFAULT_PAGE_SIZE,
            clear_selection_on_page_change: false,
        }
    }
}

impl ListSpec<QrSeriesField> {
    pub const fn qr_series() -> Self {
        Self {
            search_fields: &[
                QrSeriesField::Office,
                QrSeriesField::Month,
                QrSeriesField::Series,
            ],
            page_size: DEFAULT_PAGE_SIZE,
            clear_selection_on_page_change: true,
        }
    }
}

/// Filter, sort, paginate and select over a row set fetched wholesale.
///
/// Every derived view is recomputed from `rows` on demand. Replacing the rows
/// keeps the query, sort key, page and selection as they were.
#[derive(Debug, Clone)]
pub struct ListView<R: ListRow> {
    spec: ListSpec<R::Field>,
    rows: Vec<R>,
    query: String,
    sort: Option<SortKey<R::Field>>,
    page: usize,
    selection: Selection,
}

impl<R: ListRow> ListView<R> {
    pub fn new(spec: ListSpec<R::Field>) -> Self {
        Self {
            spec,
            rows: Vec::new(),
            query: String::new(),
            sort: None,
            page: 1,
            selection: Selection::Unselected,
        }
    }

    pub fn spec(&self) -> &ListSpec<R::Field> {
        &self.spec
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> Option<SortKey<R::Field>> {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn replace_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
    }

    /// Returns whether the query changed. A change sends the view back to page 1.
    pub fn set_query(&mut self, query: &str) -> bool {
        if self.query == query {
            return false;
        }
        self.query = query.to_owned();
        self.page = 1;
        true
    }

    pub fn toggle_sort(&mut self, field: R::Field) {
        self.sort = Some(SortKey::toggled(self.sort, field));
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page.saturating_add(1))
    }

    /// Steps back one page. A page left stale by a shrinking refetch lands on
    /// the new last page instead.
    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        let target = (self.page - 1).min(self.total_pages().max(1));
        self.move_to(target);
        true
    }

    pub fn first_page(&mut self) -> bool {
        if self.page == 1 {
            return false;
        }
        self.move_to(1);
        true
    }

    pub fn last_page(&mut self) -> bool {
        let total = self.total_pages();
        self.go_to_page(total)
    }

    /// Moves to `page` when it lies in `[1, total_pages]`; anything else is a no-op.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() || page == self.page {
            return false;
        }
        self.move_to(page);
        true
    }

    fn move_to(&mut self, page: usize) {
        self.page = page;
        if self.spec.clear_selection_on_page_change {
            self.selection.clear();
        }
    }

    pub fn select(&mut self, id: RowId) {
        self.selection.select(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Rows matching the query, in sort order.
    pub fn filtered(&self) -> Vec<&R> {
        let mut rows = filter_rows(&self.rows, &self.query, self.spec.search_fields);
        sort_rows(&mut rows, self.sort);
        rows
    }

    pub fn page_rows(&self) -> Vec<&R> {
        let rows = self.filtered();
        paging::page_slice(&rows, self.page, self.spec.page_size).to_vec()
    }

    pub fn total_pages(&self) -> usize {
        let matched = self.filtered().len();
        paging::total_pages(matched, self.spec.page_size)
    }

    pub fn page_labels(&self) -> Vec<PageLabel> {
        paging::page_labels(self.page, self.total_pages())
    }

    /// The selected row, looked up in the full set rather than the filtered one.
    pub fn selected_row(&self) -> Option<&R> {
        let id = self.selection.id()?;
        self.rows.iter().find(|row| row.row_id() == *id)
    }
}
