// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use dts_app::{
    ApiOutcome, AppCommand, AppEvent, AppMode, AppState, AssignQrForm, DEFAULT_PAGE_SIZE,
    DashboardSnapshot, Department, Document, DocumentDropdowns, DocumentField, DocumentId,
    DocumentView, FieldErrors, FieldInput, FormKind, FormPayload, ListRow, ListSpec, ListView,
    PageLabel, QrSeries, QrSeriesField, QrSeriesPrint, ScreenKind, SortDirection, SubmitAction,
    UNSELECTED, UserAccount, UserField, UserLevel,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const ELLIPSIS: &str = "…";
const SORT_ASC_MARK: &str = "▲";
const SORT_DESC_MARK: &str = "▼";
const SELECTED_MARK: &str = "*";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Everything the terminal UI needs from the outside world.
pub trait AppRuntime {
    fn load_dashboard(&mut self) -> Result<DashboardSnapshot>;
    fn load_documents(&mut self) -> Result<Vec<Document>>;
    fn load_users(&mut self) -> Result<Vec<UserAccount>>;
    fn load_departments(&mut self) -> Result<Vec<Department>>;
    fn load_qr_series(&mut self, office: &str) -> Result<Vec<QrSeries>>;
    fn view_document(&mut self, id: DocumentId) -> Result<DocumentView>;
    fn delete_document(&mut self, id: DocumentId) -> Result<ApiOutcome<()>>;
    fn load_document_dropdowns(&mut self) -> Result<DocumentDropdowns>;
    fn submit_form(
        &mut self,
        payload: &FormPayload,
        action: SubmitAction,
    ) -> Result<ApiOutcome<()>>;
    fn print_qr_series(&mut self, series: &str, office: &str) -> Result<QrSeriesPrint>;
    /// Host that attachment links are built against.
    fn base_url(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

/// Columns a list screen shows for its row type.
trait TableRow: ListRow {
    const COLUMNS: &'static [Self::Field];

    fn column_label(field: Self::Field) -> &'static str;

    fn cell_text(&self, field: Self::Field) -> String {
        self.field_text(field)
    }
}

impl TableRow for Document {
    const COLUMNS: &'static [DocumentField] = &DocumentField::COLUMNS;

    fn column_label(field: DocumentField) -> &'static str {
        field.label()
    }
}

impl TableRow for UserAccount {
    const COLUMNS: &'static [UserField] = &UserField::COLUMNS;

    fn column_label(field: UserField) -> &'static str {
        field.label()
    }

    fn cell_text(&self, field: UserField) -> String {
        match field {
            UserField::Designation => self.designation_label().to_owned(),
            other => self.field_text(other),
        }
    }
}

impl TableRow for QrSeries {
    const COLUMNS: &'static [QrSeriesField] = &QrSeriesField::COLUMNS;

    fn column_label(field: QrSeriesField) -> &'static str {
        field.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStep {
    Next,
    Prev,
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectedRow {
    selected: bool,
    cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableProjection {
    headers: Vec<String>,
    rows: Vec<ProjectedRow>,
    pager: String,
    matched: usize,
    total: usize,
}

/// Row-type-erased view over the list behind the active screen.
trait ActiveList {
    fn projection(&self, sort_column: usize) -> TableProjection;
    fn column_count(&self) -> usize;
    fn column_name(&self, column: usize) -> &'static str;
    fn query_text(&self) -> &str;
    fn apply_query(&mut self, query: &str) -> bool;
    fn sort_by_column(&mut self, column: usize) -> Option<String>;
    fn reset_sort(&mut self);
    fn page_len(&self) -> usize;
    fn toggle_at(&mut self, index: usize) -> Option<bool>;
    fn step_page(&mut self, step: PageStep) -> bool;
    fn page_position(&self) -> (usize, usize);
}

impl<R: TableRow> ActiveList for ListView<R> {
    fn projection(&self, sort_column: usize) -> TableProjection {
        let sort = self.sort();
        let headers = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let mark = match sort {
                    Some(key) if key.field == *field => match key.direction {
                        SortDirection::Asc => format!(" {SORT_ASC_MARK}"),
                        SortDirection::Desc => format!(" {SORT_DESC_MARK}"),
                    },
                    _ => String::new(),
                };
                let label = R::column_label(*field);
                if index == sort_column {
                    format!("[{label}{mark}]")
                } else {
                    format!("{label}{mark}")
                }
            })
            .collect();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|row| ProjectedRow {
                selected: self.selection().is_selected(&row.row_id()),
                cells: R::COLUMNS
                    .iter()
                    .map(|field| row.cell_text(*field))
                    .collect(),
            })
            .collect();

        TableProjection {
            headers,
            rows,
            pager: pager_text(&self.page_labels(), self.page()),
            matched: self.filtered().len(),
            total: self.rows().len(),
        }
    }

    fn column_count(&self) -> usize {
        R::COLUMNS.len()
    }

    fn column_name(&self, column: usize) -> &'static str {
        R::COLUMNS
            .get(column)
            .map(|field| R::column_label(*field))
            .unwrap_or_default()
    }

    fn query_text(&self) -> &str {
        self.query()
    }

    fn apply_query(&mut self, query: &str) -> bool {
        self.set_query(query)
    }

    fn sort_by_column(&mut self, column: usize) -> Option<String> {
        let field = *R::COLUMNS.get(column)?;
        self.toggle_sort(field);
        let direction = self
            .sort()
            .map(|key| key.direction)
            .unwrap_or(SortDirection::Asc);
        Some(format!(
            "sort {} {}",
            R::column_label(field).to_lowercase(),
            direction.as_str()
        ))
    }

    fn reset_sort(&mut self) {
        self.clear_sort();
    }

    fn page_len(&self) -> usize {
        self.page_rows().len()
    }

    fn toggle_at(&mut self, index: usize) -> Option<bool> {
        let id = self.page_rows().get(index)?.row_id();
        self.select(id.clone());
        Some(self.selection().is_selected(&id))
    }

    fn step_page(&mut self, step: PageStep) -> bool {
        match step {
            PageStep::Next => self.next_page(),
            PageStep::Prev => self.prev_page(),
            PageStep::First => self.first_page(),
            PageStep::Last => self.last_page(),
        }
    }

    fn page_position(&self) -> (usize, usize) {
        (self.page(), self.total_pages())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormUiState {
    payload: FormPayload,
    field_index: usize,
    errors: FieldErrors,
}

impl FormUiState {
    fn new(payload: FormPayload) -> Self {
        Self {
            payload,
            field_index: 0,
            errors: FieldErrors::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentOverlay {
    view: DocumentView,
    base_url: String,
}

#[derive(Debug, Clone)]
struct ViewData {
    dashboard: DashboardSnapshot,
    documents: ListView<Document>,
    users: ListView<UserAccount>,
    qr: ListView<QrSeries>,
    departments: Vec<Department>,
    dropdowns: DocumentDropdowns,
    qr_office: Option<String>,
    cursor: usize,
    sort_column: usize,
    search_input: String,
    form: Option<FormUiState>,
    detail: Option<DocumentOverlay>,
    print: Option<QrSeriesPrint>,
    pending_delete: Option<DocumentId>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(page_size: usize) -> Self {
        Self {
            dashboard: DashboardSnapshot::default(),
            documents: ListView::new(ListSpec::documents().with_page_size(page_size)),
            users: ListView::new(ListSpec::users().with_page_size(page_size)),
            qr: ListView::new(ListSpec::qr_series().with_page_size(page_size)),
            departments: Vec::new(),
            dropdowns: DocumentDropdowns::default(),
            qr_office: None,
            cursor: 0,
            sort_column: 0,
            search_input: String::new(),
            form: None,
            detail: None,
            print: None,
            pending_delete: None,
            help_visible: false,
            status_token: 0,
        }
    }

    fn list(&self, screen: ScreenKind) -> Option<&dyn ActiveList> {
        match screen {
            ScreenKind::Dashboard => None,
            ScreenKind::Documents => Some(&self.documents),
            ScreenKind::Users => Some(&self.users),
            ScreenKind::QrSeries => Some(&self.qr),
        }
    }

    fn list_mut(&mut self, screen: ScreenKind) -> Option<&mut dyn ActiveList> {
        match screen {
            ScreenKind::Dashboard => None,
            ScreenKind::Documents => Some(&mut self.documents),
            ScreenKind::Users => Some(&mut self.users),
            ScreenKind::QrSeries => Some(&mut self.qr),
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    page_size: usize,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let mut view_data = ViewData::new(page_size);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        emit_status(
            state,
            &mut view_data,
            &internal_tx,
            format!("load failed: {error:#}"),
        );
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, &mut view_data, &internal_tx, key)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if view_data.detail.is_some() {
        view_data.detail = None;
        return false;
    }

    if view_data.print.is_some() {
        view_data.print = None;
        return false;
    }

    match state.mode {
        AppMode::Form(_) => {
            handle_form_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Search => {
            handle_search_key(state, view_data, internal_tx, key);
            false
        }
        AppMode::ConfirmDelete => {
            handle_delete_confirmation(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let screen = state.active_screen;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::NextScreen, internal_tx);
        }
        KeyCode::BackTab => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::PrevScreen, internal_tx);
        }
        KeyCode::Char('j') | KeyCode::Down => move_cursor(view_data, screen, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(view_data, screen, -1),
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(status) = move_sort_column(view_data, screen, -1) {
                emit_status(state, view_data, internal_tx, status);
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(status) = move_sort_column(view_data, screen, 1) {
                emit_status(state, view_data, internal_tx, status);
            }
        }
        KeyCode::Char(' ') => {
            let cursor = view_data.cursor;
            let status = match view_data.list_mut(screen) {
                None => "nothing to select here",
                Some(list) => match list.toggle_at(cursor) {
                    Some(true) => "row selected",
                    Some(false) => "selection cleared",
                    None => "nothing to select",
                },
            };
            emit_status(state, view_data, internal_tx, status);
        }
        KeyCode::Char('/') => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::EnterSearch, internal_tx);
            if state.mode == AppMode::Search {
                view_data.search_input = view_data
                    .list(screen)
                    .map(|list| list.query_text().to_owned())
                    .unwrap_or_default();
            }
        }
        KeyCode::Char('s') => {
            let column = view_data.sort_column;
            if let Some(status) = view_data
                .list_mut(screen)
                .and_then(|list| list.sort_by_column(column))
            {
                view_data.cursor = 0;
                emit_status(state, view_data, internal_tx, status);
            }
        }
        KeyCode::Char('S') => {
            if let Some(list) = view_data.list_mut(screen) {
                list.reset_sort();
                view_data.cursor = 0;
                emit_status(state, view_data, internal_tx, "sort cleared");
            }
        }
        KeyCode::Char('n') | KeyCode::PageDown => {
            step_page(state, view_data, internal_tx, PageStep::Next);
        }
        KeyCode::Char('p') | KeyCode::PageUp => {
            step_page(state, view_data, internal_tx, PageStep::Prev);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            step_page(state, view_data, internal_tx, PageStep::First);
        }
        KeyCode::Char('G') | KeyCode::End => {
            step_page(state, view_data, internal_tx, PageStep::Last);
        }
        KeyCode::Char('r') => {
            let status = match refresh_view_data(state, runtime, view_data) {
                Ok(()) => "refreshed".to_owned(),
                Err(error) => format!("load failed: {error:#}"),
            };
            emit_status(state, view_data, internal_tx, status);
        }
        KeyCode::Char('a') => open_form(state, runtime, view_data, internal_tx),
        KeyCode::Char('v') => view_selected_document(state, runtime, view_data, internal_tx),
        KeyCode::Char('d') => request_delete(state, view_data, internal_tx),
        KeyCode::Char('o') => next_office(state, runtime, view_data, internal_tx),
        KeyCode::Char('P') => print_selected_series(state, runtime, view_data, internal_tx),
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn move_cursor(view_data: &mut ViewData, screen: ScreenKind, delta: isize) {
    let len = view_data.list(screen).map_or(0, |list| list.page_len());
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let next = (view_data.cursor as isize + delta).clamp(0, len as isize - 1);
    view_data.cursor = next as usize;
}

fn move_sort_column(view_data: &mut ViewData, screen: ScreenKind, delta: isize) -> Option<String> {
    let list = view_data.list(screen)?;
    let count = list.column_count();
    if count == 0 {
        return None;
    }
    let next = (view_data.sort_column as isize + delta).clamp(0, count as isize - 1) as usize;
    let label = list.column_name(next).to_lowercase();
    view_data.sort_column = next;
    Some(format!("column {label}"))
}

fn step_page(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    step: PageStep,
) {
    let Some(list) = view_data.list_mut(state.active_screen) else {
        emit_status(state, view_data, internal_tx, "nothing to page here");
        return;
    };
    let moved = list.step_page(step);
    let (page, total) = list.page_position();
    let status = if moved {
        view_data.cursor = 0;
        format!("page {page} of {total}")
    } else {
        match step {
            PageStep::Next | PageStep::Last => "already on the last page".to_owned(),
            PageStep::Prev | PageStep::First => "already on the first page".to_owned(),
        }
    };
    emit_status(state, view_data, internal_tx, status);
}

fn clamp_cursor(view_data: &mut ViewData, screen: ScreenKind) {
    let len = view_data.list(screen).map_or(0, |list| list.page_len());
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let screen = state.active_screen;
    match key.code {
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            let status = if view_data.search_input.is_empty() {
                "filter cleared".to_owned()
            } else {
                format!("filter: {}", view_data.search_input)
            };
            emit_status(state, view_data, internal_tx, status);
        }
        KeyCode::Esc => {
            view_data.search_input.clear();
            if let Some(list) = view_data.list_mut(screen) {
                list.apply_query("");
            }
            clamp_cursor(view_data, screen);
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "filter cleared");
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            apply_search_input(view_data, screen);
        }
        KeyCode::Char(ch) => {
            view_data.search_input.push(ch);
            apply_search_input(view_data, screen);
        }
        _ => {}
    }
}

fn apply_search_input(view_data: &mut ViewData, screen: ScreenKind) {
    let query = view_data.search_input.clone();
    if let Some(list) = view_data.list_mut(screen)
        && list.apply_query(&query)
    {
        view_data.cursor = 0;
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "form canceled");
        }
        KeyCode::Tab | KeyCode::Down => move_form_field(view_data, 1),
        KeyCode::BackTab | KeyCode::Up => move_form_field(view_data, -1),
        KeyCode::Left => cycle_form_choice(state, view_data, internal_tx, -1),
        KeyCode::Right => cycle_form_choice(state, view_data, internal_tx, 1),
        KeyCode::Enter => submit_form(state, runtime, view_data, internal_tx, SubmitAction::Submit),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if matches!(state.mode, AppMode::Form(FormKind::AddDocument)) {
                submit_form(state, runtime, view_data, internal_tx, SubmitAction::Draft);
            } else {
                emit_status(state, view_data, internal_tx, "only documents have drafts");
            }
        }
        KeyCode::Backspace => edit_form_text(state, view_data, internal_tx, None),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit_form_text(state, view_data, internal_tx, Some(ch));
        }
        _ => {}
    }
}

fn move_form_field(view_data: &mut ViewData, delta: isize) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let len = form.payload.fields().len() as isize;
    if len == 0 {
        return;
    }
    form.field_index = (form.field_index as isize + delta).rem_euclid(len) as usize;
}

fn edit_form_text(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    ch: Option<char>,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let Some(field) = form.payload.fields().get(form.field_index).copied() else {
        return;
    };
    if field.input == FieldInput::Choice {
        emit_status(state, view_data, internal_tx, "use left/right to choose");
        return;
    }
    let mut value = form.payload.value(field.key).to_owned();
    match ch {
        Some(ch) => value.push(ch),
        None => {
            value.pop();
        }
    }
    form.payload.set_value(field.key, value);
}

fn cycle_form_choice(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let Some(form) = view_data.form.as_ref() else {
        return;
    };
    let Some(field) = form.payload.fields().get(form.field_index).copied() else {
        return;
    };
    if field.input != FieldInput::Choice {
        return;
    }
    let options = choice_options(view_data, field.key);
    let current = form.payload.value(field.key);
    let position = options
        .iter()
        .position(|option| option == current)
        .unwrap_or(0) as isize;
    let next = (position + delta).rem_euclid(options.len() as isize) as usize;
    let choice = options[next].clone();
    if let Some(form) = view_data.form.as_mut() {
        form.payload.set_value(field.key, choice.clone());
    }
    emit_status(
        state,
        view_data,
        internal_tx,
        format!("{} {choice}", field.label.to_lowercase()),
    );
}

/// Picker values for a choice field, led by the unselected marker.
fn choice_options(view_data: &ViewData, key: &str) -> Vec<String> {
    let mut options = vec![UNSELECTED.to_owned()];
    match key {
        "doctype" => options.extend(
            view_data
                .dropdowns
                .doctypes
                .iter()
                .filter_map(|doctype| doctype.code.clone()),
        ),
        "docsubj" => options.extend(
            view_data
                .dropdowns
                .docsubj
                .iter()
                .filter_map(|subject| subject.doc_subject.clone()),
        ),
        "office_dept" | "selected_office" => options.extend(office_codes(&view_data.departments)),
        "user_level" => options.extend(UserLevel::ALL.iter().map(|level| level.as_str().to_owned())),
        _ => {}
    }
    options
}

fn office_codes(departments: &[Department]) -> Vec<String> {
    departments
        .iter()
        .map(|department| department.code().to_owned())
        .filter(|code| !code.is_empty())
        .collect()
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: SubmitAction,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    if let Err(errors) = form.payload.validate() {
        let summary = errors.to_string();
        form.errors = errors;
        emit_status(state, view_data, internal_tx, summary);
        return;
    }

    let payload = form.payload.clone();
    let status = match runtime.submit_form(&payload, action) {
        Ok(ApiOutcome::Success(())) => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("load failed: {error:#}"),
                );
                return;
            }
            success_status(payload.kind(), action).to_owned()
        }
        Ok(ApiOutcome::FieldErrors(errors)) => {
            let summary = errors.to_string();
            form.errors = errors;
            summary
        }
        Ok(ApiOutcome::GeneralError(message)) => {
            form.errors = FieldErrors::new();
            message
        }
        Err(error) => format!("submit failed: {error:#}"),
    };
    emit_status(state, view_data, internal_tx, status);
}

fn success_status(kind: FormKind, action: SubmitAction) -> &'static str {
    match (kind, action) {
        (FormKind::AddDocument, SubmitAction::Submit) => "document submitted",
        (FormKind::AddDocument, SubmitAction::Draft) => "draft saved",
        (FormKind::RegisterUser, _) => "user registered",
        (FormKind::AssignQr, _) => "QR series assigned",
    }
}

fn open_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = match state.active_screen {
        ScreenKind::Dashboard => {
            emit_status(state, view_data, internal_tx, "nothing to add here");
            return;
        }
        ScreenKind::Documents => FormKind::AddDocument,
        ScreenKind::Users => FormKind::RegisterUser,
        ScreenKind::QrSeries => FormKind::AssignQr,
    };

    let mut warning = None;
    match kind {
        FormKind::AddDocument => match runtime.load_document_dropdowns() {
            Ok(dropdowns) => view_data.dropdowns = dropdowns,
            Err(error) => warning = Some(format!("pickers unavailable: {error:#}")),
        },
        FormKind::RegisterUser | FormKind::AssignQr => {
            if view_data.departments.is_empty() {
                match runtime.load_departments() {
                    Ok(departments) => view_data.departments = departments,
                    Err(error) => warning = Some(format!("offices unavailable: {error:#}")),
                }
            }
        }
    }

    let payload = match (kind, view_data.qr_office.as_deref()) {
        (FormKind::AssignQr, Some(office)) => FormPayload::AssignQr(AssignQrForm::for_office(office)),
        _ => FormPayload::blank_for(kind),
    };
    view_data.form = Some(FormUiState::new(payload));
    state.dispatch(AppCommand::OpenForm(kind));
    let status = warning.unwrap_or_else(|| kind.title().to_lowercase());
    emit_status(state, view_data, internal_tx, status);
}

fn view_selected_document<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_screen != ScreenKind::Documents {
        emit_status(state, view_data, internal_tx, "nothing to view here");
        return;
    }
    let Some(id) = view_data.documents.selected_row().map(|document| document.id) else {
        emit_status(state, view_data, internal_tx, "select a row first");
        return;
    };
    match runtime.view_document(id) {
        Ok(view) => {
            view_data.detail = Some(DocumentOverlay {
                view,
                base_url: runtime.base_url().to_owned(),
            });
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("view failed: {error:#}"),
        ),
    }
}

fn request_delete(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_screen != ScreenKind::Documents {
        emit_status(state, view_data, internal_tx, "nothing to delete here");
        return;
    }
    let Some(document) = view_data.documents.selected_row() else {
        emit_status(state, view_data, internal_tx, "select a row first");
        return;
    };
    let label = document
        .tracking_number
        .clone()
        .unwrap_or_else(|| document.id.to_string());
    view_data.pending_delete = Some(document.id);
    state.dispatch(AppCommand::ConfirmDelete);
    emit_status(
        state,
        view_data,
        internal_tx,
        format!("delete {label}? y to confirm"),
    );
}

fn handle_delete_confirmation<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    state.dispatch(AppCommand::ExitToNav);
    let pending = view_data.pending_delete.take();
    let (KeyCode::Char('y'), Some(id)) = (key.code, pending) else {
        emit_status(state, view_data, internal_tx, "delete canceled");
        return;
    };

    let status = match runtime.delete_document(id) {
        Ok(ApiOutcome::Success(())) => {
            view_data.documents.clear_selection();
            match refresh_view_data(state, runtime, view_data) {
                Ok(()) => "document deleted".to_owned(),
                Err(error) => format!("load failed: {error:#}"),
            }
        }
        Ok(outcome) => outcome
            .summary()
            .unwrap_or_else(|| "delete failed".to_owned()),
        Err(error) => format!("delete failed: {error:#}"),
    };
    emit_status(state, view_data, internal_tx, status);
}

fn next_office<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_screen != ScreenKind::QrSeries {
        emit_status(state, view_data, internal_tx, "offices only apply to qr series");
        return;
    }
    if view_data.departments.is_empty() {
        match runtime.load_departments() {
            Ok(departments) => view_data.departments = departments,
            Err(error) => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("load failed: {error:#}"),
                );
                return;
            }
        }
    }

    let codes = office_codes(&view_data.departments);
    if codes.is_empty() {
        emit_status(state, view_data, internal_tx, "no offices available");
        return;
    }
    let next = view_data
        .qr_office
        .as_deref()
        .and_then(|current| codes.iter().position(|code| code == current))
        .map_or(0, |index| (index + 1) % codes.len());
    let office = codes[next].clone();

    match runtime.load_qr_series(&office) {
        Ok(rows) => {
            view_data.qr = ListView::new(*view_data.qr.spec());
            view_data.qr.replace_rows(rows);
            view_data.qr_office = Some(office.clone());
            view_data.cursor = 0;
            emit_status(state, view_data, internal_tx, format!("office {office}"));
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("load failed: {error:#}"),
        ),
    }
}

fn print_selected_series<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_screen != ScreenKind::QrSeries {
        emit_status(state, view_data, internal_tx, "nothing to print here");
        return;
    }
    let Some(row) = view_data.qr.selected_row() else {
        emit_status(state, view_data, internal_tx, "select a row first");
        return;
    };
    let series = row.series.clone().unwrap_or_default();
    let office = row
        .office
        .clone()
        .or_else(|| view_data.qr_office.clone())
        .unwrap_or_default();
    match runtime.print_qr_series(&series, &office) {
        Ok(summary) => view_data.print = Some(summary),
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("print failed: {error:#}"),
        ),
    }
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::ScreenChanged(_)))
    {
        view_data.cursor = 0;
        view_data.sort_column = 0;
        if let Err(error) = refresh_view_data(state, runtime, view_data) {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("load failed: {error:#}"),
            );
            return;
        }
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    match state.active_screen {
        ScreenKind::Dashboard => {
            view_data.dashboard = runtime.load_dashboard()?;
        }
        ScreenKind::Documents => {
            let rows = runtime.load_documents()?;
            view_data.documents.replace_rows(rows);
        }
        ScreenKind::Users => {
            let rows = runtime.load_users()?;
            view_data.users.replace_rows(rows);
        }
        ScreenKind::QrSeries => {
            if view_data.departments.is_empty() {
                view_data.departments = runtime.load_departments()?;
            }
            if view_data.qr_office.is_none() {
                view_data.qr_office = office_codes(&view_data.departments).into_iter().next();
            }
            let rows = match view_data.qr_office.as_deref() {
                Some(office) => runtime.load_qr_series(office)?,
                None => Vec::new(),
            };
            view_data.qr.replace_rows(rows);
        }
    }
    clamp_cursor(view_data, state.active_screen);
    Ok(())
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ScreenKind::ALL
        .iter()
        .position(|screen| *screen == state.active_screen)
        .unwrap_or(0);
    let titles = ScreenKind::ALL
        .iter()
        .map(|screen| screen.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("dts").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match view_data.list(state.active_screen) {
        None => {
            let body = Paragraph::new(render_dashboard_text(&view_data.dashboard))
                .block(Block::default().borders(Borders::ALL).title("dashboard"));
            frame.render_widget(body, layout[1]);
        }
        Some(list) => {
            let projection = list.projection(view_data.sort_column);
            let title = list_title(state, view_data, &projection, list.query_text());
            render_table(frame, layout[1], title, &projection, view_data.cursor);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(form) = &view_data.form {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_form_text(form)).block(
            Block::default()
                .title(form.payload.kind().title())
                .borders(Borders::ALL),
        );
        frame.render_widget(overlay, area);
    }

    if let Some(detail) = &view_data.detail {
        let area = centered_rect(75, 70, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_document_text(detail))
            .block(Block::default().title("document").borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if let Some(print) = &view_data.print {
        let area = centered_rect(50, 40, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_print_text(print))
            .block(Block::default().title("qr series").borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: String,
    projection: &TableProjection,
    cursor: usize,
) {
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let mut widths = vec![Constraint::Length(1)];
    widths.extend(vec![Constraint::Min(8); projection.headers.len().max(1)]);

    let header_cells = std::iter::once(Cell::from(String::new())).chain(
        projection.headers.iter().map(|label| {
            Cell::from(label.clone()).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    );
    let header = Row::new(header_cells);

    let rows = projection.rows.iter().enumerate().map(|(index, row)| {
        let mark = if row.selected { SELECTED_MARK } else { "" };
        let mut style = Style::default();
        if row.selected {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        if index == cursor {
            style = style.bg(Color::DarkGray);
        }
        let cells = std::iter::once(Cell::from(mark))
            .chain(row.cells.iter().map(|cell| Cell::from(cell.clone())))
            .collect::<Vec<_>>();
        Row::new(cells).style(style)
    });

    let table = Table::new(rows, widths).header(header).column_spacing(1);
    frame.render_widget(table, parts[0]);

    let pager = Paragraph::new(projection.pager.clone()).style(Style::default().fg(Color::Cyan));
    frame.render_widget(pager, parts[1]);
}

fn list_title(
    state: &AppState,
    view_data: &ViewData,
    projection: &TableProjection,
    query: &str,
) -> String {
    let mut title = format!(
        "{} ({} of {})",
        state.active_screen.label(),
        projection.matched,
        projection.total
    );
    if state.active_screen == ScreenKind::QrSeries
        && let Some(office) = &view_data.qr_office
    {
        title.push_str(&format!(" office {office}"));
    }
    if !query.is_empty() {
        title.push_str(&format!(" /{query}"));
    }
    title
}

fn pager_text(labels: &[PageLabel], current: usize) -> String {
    labels
        .iter()
        .map(|label| match label {
            PageLabel::Page(page) if *page == current => format!("[{page}]"),
            PageLabel::Page(page) => page.to_string(),
            PageLabel::LeftEllipsis | PageLabel::RightEllipsis => ELLIPSIS.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_dashboard_text(snapshot: &DashboardSnapshot) -> String {
    let mut lines = Vec::new();
    match &snapshot.user {
        Some(user) => {
            lines.push(format!(
                "signed in: {} ({})",
                user.name.as_deref().unwrap_or("unknown"),
                user.username.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "office: {}",
                user.office_dept.as_deref().unwrap_or("-")
            ));
            lines.push(format!(
                "level: {}",
                user.user_level.as_deref().unwrap_or("-")
            ));
        }
        None => lines.push("signed in: unknown".to_owned()),
    }
    lines.push(String::new());
    let counts = &snapshot.counts;
    for (label, value) in [
        ("released", counts.released),
        ("pending", counts.pending),
        ("incoming", counts.incoming),
        ("received", counts.received),
        ("draft", counts.draft),
        ("terminal", counts.terminal),
    ] {
        lines.push(format!("{label}: {value}"));
    }
    lines.join("\n")
}

fn render_form_text(form: &FormUiState) -> String {
    let mut lines = Vec::new();
    for (index, field) in form.payload.fields().iter().enumerate() {
        let pointer = if index == form.field_index { ">" } else { " " };
        let raw = form.payload.value(field.key);
        let value = match field.input {
            FieldInput::Text => raw.to_owned(),
            FieldInput::Secret => "*".repeat(raw.chars().count()),
            FieldInput::Choice => format!("< {raw} >"),
        };
        lines.push(format!("{pointer} {}: {value}", field.label));
        for message in form.errors.get(field.key) {
            lines.push(format!("    ! {message}"));
        }
    }
    let known: Vec<&str> = form.payload.fields().iter().map(|field| field.key).collect();
    for (field, messages) in form.errors.iter() {
        if known.contains(&field) {
            continue;
        }
        for message in messages {
            lines.push(format!("  ! {field}: {message}"));
        }
    }
    lines.push(String::new());
    let mut hints = "tab/shift+tab field | left/right choose | enter submit".to_owned();
    if form.payload.kind() == FormKind::AddDocument {
        hints.push_str(" | ctrl+d draft");
    }
    hints.push_str(" | esc cancel");
    lines.push(hints);
    lines.join("\n")
}

fn render_document_text(overlay: &DocumentOverlay) -> String {
    let detail = &overlay.view.detail;
    let mut lines = Vec::new();
    for (label, value) in [
        ("tracking number", &detail.tracking_number),
        ("title", &detail.doc_title),
        ("type", &detail.doc_type),
        ("subject", &detail.doc_subject),
        ("office", &detail.originating_office),
        ("status", &detail.status),
        ("remarks", &detail.remarks),
    ] {
        lines.push(format!("{label}: {}", value.as_deref().unwrap_or("-")));
    }
    for (key, value) in &detail.extra {
        if value.is_null() {
            continue;
        }
        let text = value
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| value.to_string());
        lines.push(format!("{key}: {text}"));
    }
    lines.push(String::new());
    lines.push("attachments:".to_owned());
    let links: Vec<String> = overlay
        .view
        .files
        .iter()
        .filter_map(|file| file.url(&overlay.base_url))
        .collect();
    if links.is_empty() {
        lines.push("  (none)".to_owned());
    } else {
        lines.extend(links.into_iter().map(|link| format!("  {link}")));
    }
    lines.join("\n")
}

fn render_print_text(print: &QrSeriesPrint) -> String {
    let count = |value: Option<i64>| value.map_or_else(|| "-".to_owned(), |n| n.to_string());
    [
        format!("series: {}", print.series.as_deref().unwrap_or("-")),
        format!("office: {}", print.office.as_deref().unwrap_or("-")),
        format!("month: {}", print.for_month_year.as_deref().unwrap_or("-")),
        format!("initial: {}", count(print.initial_count)),
        format!("used: {}", count(print.used)),
        format!("remaining: {}", count(print.remaining)),
    ]
    .join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
nav: tab/shift+tab screens | j/k row | space select | / search | q quit\n\
sort: h/l column | s toggle | S clear\n\
pages: n/p next/prev | g/G first/last\n\
actions: r refresh | a add | v view document | d delete document | o next office | P print series\n\
form: tab/shift+tab field | left/right choose | enter submit | ctrl+d draft | esc cancel\n\
search: type to filter | enter keep | esc clear\n\
overlays: any key close | ? help"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible || view_data.detail.is_some() || view_data.print.is_some() {
        return String::new();
    }
    let hints = match state.mode {
        AppMode::Nav => nav_hints(state.active_screen).to_owned(),
        AppMode::Search => format!("/{} | enter keep | esc clear", view_data.search_input),
        AppMode::Form(_) => "tab field | enter submit | esc cancel".to_owned(),
        AppMode::ConfirmDelete => "y delete | any other key cancels".to_owned(),
    };
    let mode = mode_label(state.mode);
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn nav_hints(screen: ScreenKind) -> &'static str {
    match screen {
        ScreenKind::Dashboard => "tab screens | r refresh | ? help | q quit",
        ScreenKind::Documents => {
            "j/k space | / | h/l s/S | n/p g/G | a add v view d delete | ? | q"
        }
        ScreenKind::Users => "j/k space | / | h/l s/S | n/p g/G | a register | ? | q",
        ScreenKind::QrSeries => {
            "j/k space | / | h/l s/S | n/p g/G | a assign o office P print | ? | q"
        }
    }
}

fn mode_label(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Nav => "NAV",
        AppMode::Search => "SEARCH",
        AppMode::Form(_) => "FORM",
        AppMode::ConfirmDelete => "DELETE",
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        ActiveList, AppRuntime, InternalEvent, ViewData, emit_status, handle_key_event,
        help_overlay_text, pager_text, process_internal_events, refresh_view_data,
        render_dashboard_text, render_document_text, render_form_text, render_print_text,
        status_text,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use dts_app::{
        ApiOutcome, AppMode, AppState, AttachedFile, CurrentUser, DEFAULT_PAGE_SIZE,
        DashboardCounts, DashboardSnapshot, Department, Document, DocumentDetail,
        DocumentDropdowns, DocumentId, DocumentView, FieldErrors, FormKind, FormPayload,
        QrSeries, QrSeriesPrint, RowId, ScreenKind, Selection, SubmitAction, UserAccount,
        page_labels,
    };
    use dts_testkit::OfficeFaker;
    use std::collections::BTreeMap;
    use std::sync::mpsc::{self, Receiver, Sender};

    #[derive(Debug, Default)]
    struct TestRuntime {
        documents: Vec<Document>,
        users: Vec<UserAccount>,
        departments: Vec<Department>,
        qr_by_office: BTreeMap<String, Vec<QrSeries>>,
        submitted: Vec<(FormPayload, SubmitAction)>,
        submit_outcome: Option<ApiOutcome<()>>,
        deleted: Vec<DocumentId>,
        qr_requests: Vec<String>,
        printed: Vec<(String, String)>,
        fail_loads: bool,
    }

    impl TestRuntime {
        fn with_documents(documents: Vec<Document>) -> Self {
            Self {
                documents,
                ..Self::default()
            }
        }

        fn with_offices() -> Self {
            let mut faker = OfficeFaker::new(17);
            let mut qr_by_office = BTreeMap::new();
            qr_by_office.insert("MO".to_owned(), faker.qr_series("MO", 25));
            qr_by_office.insert("VMO".to_owned(), faker.qr_series("VMO", 3));
            Self {
                departments: dts_testkit::departments(),
                qr_by_office,
                ..Self::default()
            }
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.fail_loads {
                anyhow::bail!("session expired");
            }
            Ok(())
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_dashboard(&mut self) -> anyhow::Result<DashboardSnapshot> {
            self.check()?;
            Ok(DashboardSnapshot {
                counts: DashboardCounts {
                    released: 4,
                    pending: 2,
                    ..DashboardCounts::default()
                },
                user: Some(CurrentUser {
                    name: Some("Ana Reyes".to_owned()),
                    username: Some("areyes".to_owned()),
                    office_dept: Some("ICTO".to_owned()),
                    user_level: Some("Admin".to_owned()),
                }),
            })
        }

        fn load_documents(&mut self) -> anyhow::Result<Vec<Document>> {
            self.check()?;
            Ok(self.documents.clone())
        }

        fn load_users(&mut self) -> anyhow::Result<Vec<UserAccount>> {
            self.check()?;
            Ok(self.users.clone())
        }

        fn load_departments(&mut self) -> anyhow::Result<Vec<Department>> {
            self.check()?;
            Ok(self.departments.clone())
        }

        fn load_qr_series(&mut self, office: &str) -> anyhow::Result<Vec<QrSeries>> {
            self.check()?;
            self.qr_requests.push(office.to_owned());
            Ok(self.qr_by_office.get(office).cloned().unwrap_or_default())
        }

        fn view_document(&mut self, id: DocumentId) -> anyhow::Result<DocumentView> {
            let document = self
                .documents
                .iter()
                .find(|document| document.id == id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("document {id} not found"))?;
            Ok(DocumentView {
                detail: DocumentDetail {
                    tracking_number: document.tracking_number.clone(),
                    doc_title: document.doc_title.clone(),
                    doc_type: Some("Memorandum".to_owned()),
                    doc_subject: None,
                    originating_office: document.originating_office.clone(),
                    remarks: None,
                    status: document.status.clone(),
                    extra: BTreeMap::new(),
                },
                files: vec![AttachedFile {
                    filename: Some("memo.pdf".to_owned()),
                    from_office: Some("CTO".to_owned()),
                }],
            })
        }

        fn delete_document(&mut self, id: DocumentId) -> anyhow::Result<ApiOutcome<()>> {
            self.deleted.push(id);
            self.documents.retain(|document| document.id != id);
            Ok(ApiOutcome::Success(()))
        }

        fn load_document_dropdowns(&mut self) -> anyhow::Result<DocumentDropdowns> {
            Ok(dts_testkit::dropdowns())
        }

        fn submit_form(
            &mut self,
            payload: &FormPayload,
            action: SubmitAction,
        ) -> anyhow::Result<ApiOutcome<()>> {
            self.submitted.push((payload.clone(), action));
            Ok(self
                .submit_outcome
                .clone()
                .unwrap_or(ApiOutcome::Success(())))
        }

        fn print_qr_series(&mut self, series: &str, office: &str) -> anyhow::Result<QrSeriesPrint> {
            self.printed.push((series.to_owned(), office.to_owned()));
            Ok(QrSeriesPrint {
                series: Some(series.to_owned()),
                office: Some(office.to_owned()),
                for_month_year: Some("2026-01".to_owned()),
                initial_count: Some(100),
                remaining: Some(60),
                used: Some(40),
            })
        }

        fn base_url(&self) -> &str {
            "http://dts.test"
        }
    }

    struct Harness {
        state: AppState,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        _rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(screen: ScreenKind, runtime: &mut TestRuntime) -> Self {
            let state = AppState::starting_on(screen);
            let mut view_data = ViewData::new(DEFAULT_PAGE_SIZE);
            refresh_view_data(&state, runtime, &mut view_data).expect("initial load");
            let (tx, rx) = mpsc::channel();
            Self {
                state,
                view_data,
                tx,
                _rx: rx,
            }
        }

        fn key(&mut self, runtime: &mut TestRuntime, code: KeyCode, modifiers: KeyModifiers) -> bool {
            handle_key_event(
                &mut self.state,
                runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            )
        }

        fn press(&mut self, runtime: &mut TestRuntime, ch: char) -> bool {
            self.key(runtime, KeyCode::Char(ch), KeyModifiers::NONE)
        }

        fn code(&mut self, runtime: &mut TestRuntime, code: KeyCode) {
            self.key(runtime, code, KeyModifiers::NONE);
        }

        fn type_text(&mut self, runtime: &mut TestRuntime, text: &str) {
            for ch in text.chars() {
                self.press(runtime, ch);
            }
        }

        fn status(&self) -> Option<&str> {
            self.state.status_line.as_deref()
        }

        fn document_ids(&self) -> Vec<i64> {
            self.view_data
                .documents
                .page_rows()
                .into_iter()
                .map(|document| document.id.get())
                .collect()
        }
    }

    fn document(id: i64, title: &str, office: &str) -> Document {
        Document {
            id: DocumentId::new(id),
            doc_title: Some(title.to_owned()),
            tracking_number: Some(format!("SJC-{id}")),
            originating_office: Some(office.to_owned()),
            latest_transaction: Some("Created".to_owned()),
            status: Some("Pending".to_owned()),
        }
    }

    fn sample_documents() -> Vec<Document> {
        vec![
            document(1, "Budget memo", "CTO"),
            document(2, "Travel order", "MO"),
            document(3, "budget request", "CBO"),
        ]
    }

    #[test]
    fn pager_brackets_current_page_and_marks_gaps() {
        assert_eq!(pager_text(&page_labels(5, 10), 5), "1 … 3 4 [5] 6 7 … 10");
        assert_eq!(pager_text(&page_labels(1, 1), 1), "[1]");
        assert_eq!(pager_text(&page_labels(1, 3), 1), "[1] 2 3");
    }

    #[test]
    fn search_filters_and_enter_keeps_the_query() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, '/');
        assert_eq!(harness.state.mode, AppMode::Search);
        harness.type_text(&mut runtime, "budget");
        assert_eq!(harness.document_ids(), vec![1, 3]);

        harness.code(&mut runtime, KeyCode::Enter);
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.view_data.documents.query(), "budget");
        assert_eq!(harness.status(), Some("filter: budget"));
    }

    #[test]
    fn escape_clears_the_search() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, '/');
        harness.type_text(&mut runtime, "travel");
        assert_eq!(harness.document_ids(), vec![2]);
        harness.code(&mut runtime, KeyCode::Esc);
        assert_eq!(harness.document_ids(), vec![1, 2, 3]);
        assert_eq!(harness.view_data.documents.query(), "");
    }

    #[test]
    fn typing_q_while_searching_does_not_quit() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);
        harness.press(&mut runtime, '/');
        assert!(!harness.press(&mut runtime, 'q'));
        harness.code(&mut runtime, KeyCode::Enter);
        assert!(harness.press(&mut runtime, 'q'));
    }

    #[test]
    fn sort_column_toggles_direction() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, 'l');
        assert_eq!(harness.status(), Some("column title"));
        harness.press(&mut runtime, 's');
        assert_eq!(harness.document_ids(), vec![1, 3, 2]);
        assert_eq!(harness.status(), Some("sort title asc"));

        harness.press(&mut runtime, 's');
        assert_eq!(harness.document_ids(), vec![2, 3, 1]);
        let projection = harness.view_data.documents.projection(1);
        assert_eq!(projection.headers[1], "[Title ▼]");
        assert_eq!(projection.headers[0], "Tracking No.");

        harness.press(&mut runtime, 'S');
        assert_eq!(harness.document_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn view_requires_a_selection() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, 'v');
        assert_eq!(harness.status(), Some("select a row first"));
        assert!(harness.view_data.detail.is_none());

        harness.press(&mut runtime, ' ');
        assert_eq!(
            harness.view_data.documents.selection(),
            &Selection::Selected(RowId::Int(1))
        );
        harness.press(&mut runtime, 'v');
        let detail = harness.view_data.detail.as_ref().expect("detail overlay");
        let text = render_document_text(detail);
        assert!(text.contains("title: Budget memo"));
        assert!(text.contains("http://dts.test/files/CTO/memo.pdf"));

        harness.press(&mut runtime, 'x');
        assert!(harness.view_data.detail.is_none());
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, 'j');
        harness.press(&mut runtime, ' ');
        harness.press(&mut runtime, 'd');
        assert_eq!(harness.state.mode, AppMode::ConfirmDelete);
        assert_eq!(harness.status(), Some("delete SJC-2? y to confirm"));

        harness.press(&mut runtime, 'n');
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.status(), Some("delete canceled"));
        assert!(runtime.deleted.is_empty());

        harness.press(&mut runtime, 'd');
        harness.press(&mut runtime, 'y');
        assert_eq!(runtime.deleted, vec![DocumentId::new(2)]);
        assert_eq!(harness.status(), Some("document deleted"));
        assert_eq!(harness.document_ids(), vec![1, 3]);
        assert_eq!(harness.view_data.documents.selection(), &Selection::Unselected);
    }

    #[test]
    fn paging_moves_and_reports_edges() {
        let mut runtime = TestRuntime::with_documents(OfficeFaker::new(5).documents(25));
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, 'j');
        harness.press(&mut runtime, 'n');
        assert_eq!(harness.view_data.documents.page(), 2);
        assert_eq!(harness.view_data.cursor, 0);
        assert_eq!(harness.status(), Some("page 2 of 3"));

        harness.press(&mut runtime, 'G');
        assert_eq!(harness.document_ids().len(), 5);
        harness.press(&mut runtime, 'n');
        assert_eq!(harness.status(), Some("already on the last page"));
        assert_eq!(harness.view_data.documents.projection(0).pager, "1 2 [3]");

        harness.press(&mut runtime, 'g');
        assert_eq!(harness.view_data.documents.page(), 1);
        harness.press(&mut runtime, 'p');
        assert_eq!(harness.status(), Some("already on the first page"));
    }

    #[test]
    fn register_form_validates_before_submitting() {
        let mut runtime = TestRuntime::with_offices();
        let mut harness = Harness::new(ScreenKind::Users, &mut runtime);

        harness.press(&mut runtime, 'a');
        assert_eq!(harness.state.mode, AppMode::Form(FormKind::RegisterUser));
        harness.code(&mut runtime, KeyCode::Enter);

        assert!(runtime.submitted.is_empty());
        let form = harness.view_data.form.as_ref().expect("form stays open");
        assert_eq!(form.errors.first("name"), Some("First name is required."));
        assert!(render_form_text(form).contains("    ! First name is required."));
    }

    #[test]
    fn form_choices_cycle_through_pickers() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, 'a');
        harness.type_text(&mut runtime, "Memo");
        harness.code(&mut runtime, KeyCode::Tab);
        harness.code(&mut runtime, KeyCode::Right);
        let form = harness.view_data.form.as_ref().expect("form");
        assert_eq!(form.payload.value("doctitle"), "Memo");
        assert_eq!(form.payload.value("doctype"), "MEMO");

        harness.code(&mut runtime, KeyCode::Left);
        let form = harness.view_data.form.as_ref().expect("form");
        assert_eq!(form.payload.value("doctype"), "----");
    }

    #[test]
    fn server_field_errors_keep_the_form_open() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut errors = FieldErrors::new();
        errors.push("doctitle", "The doctitle field is required.");
        runtime.submit_outcome = Some(ApiOutcome::FieldErrors(errors));
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.press(&mut runtime, 'a');
        harness.key(&mut runtime, KeyCode::Char('d'), KeyModifiers::CONTROL);

        assert_eq!(runtime.submitted.len(), 1);
        assert_eq!(runtime.submitted[0].1, SubmitAction::Draft);
        assert_eq!(harness.state.mode, AppMode::Form(FormKind::AddDocument));
        let form = harness.view_data.form.as_ref().expect("form");
        assert_eq!(form.errors.first("doctitle"), Some("The doctitle field is required."));
        assert_eq!(harness.status(), Some("The doctitle field is required."));
    }

    #[test]
    fn assigning_a_series_refreshes_the_office() {
        let mut runtime = TestRuntime::with_offices();
        let mut harness = Harness::new(ScreenKind::QrSeries, &mut runtime);
        assert_eq!(harness.view_data.qr_office.as_deref(), Some("MO"));

        harness.press(&mut runtime, 'a');
        harness.code(&mut runtime, KeyCode::Tab);
        harness.type_text(&mut runtime, "25");
        harness.code(&mut runtime, KeyCode::Tab);
        harness.type_text(&mut runtime, "2026-10");
        harness.code(&mut runtime, KeyCode::Enter);

        assert_eq!(runtime.submitted.len(), 1);
        let FormPayload::AssignQr(form) = &runtime.submitted[0].0 else {
            panic!("expected a QR assignment");
        };
        assert_eq!(form.selected_office, "MO");
        assert_eq!(form.amount, "25");
        assert_eq!(form.for_month_year, "2026-10");
        assert!(harness.view_data.form.is_none());
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.status(), Some("QR series assigned"));
        assert_eq!(runtime.qr_requests, vec!["MO", "MO"]);
    }

    #[test]
    fn office_switch_loads_the_next_office() {
        let mut runtime = TestRuntime::with_offices();
        let mut harness = Harness::new(ScreenKind::QrSeries, &mut runtime);

        harness.press(&mut runtime, 'o');
        assert_eq!(harness.view_data.qr_office.as_deref(), Some("VMO"));
        assert_eq!(harness.view_data.qr.rows().len(), 3);
        assert_eq!(harness.status(), Some("office VMO"));
    }

    #[test]
    fn qr_page_change_clears_selection() {
        let mut runtime = TestRuntime::with_offices();
        let mut harness = Harness::new(ScreenKind::QrSeries, &mut runtime);

        harness.press(&mut runtime, ' ');
        assert!(harness.view_data.qr.selected_row().is_some());
        harness.press(&mut runtime, 'n');
        assert_eq!(harness.view_data.qr.selection(), &Selection::Unselected);
    }

    #[test]
    fn print_shows_series_summary() {
        let mut runtime = TestRuntime::with_offices();
        let mut harness = Harness::new(ScreenKind::QrSeries, &mut runtime);

        harness.press(&mut runtime, 'P');
        assert_eq!(harness.status(), Some("select a row first"));

        harness.press(&mut runtime, ' ');
        harness.press(&mut runtime, 'P');
        assert_eq!(runtime.printed, vec![("MO-2026-01-001".to_owned(), "MO".to_owned())]);
        let print = harness.view_data.print.as_ref().expect("print overlay");
        let text = render_print_text(print);
        assert!(text.contains("used: 40"));
        assert!(text.contains("remaining: 60"));
    }

    #[test]
    fn dashboard_lists_counts_and_user() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::new(ScreenKind::Dashboard, &mut runtime);
        let text = render_dashboard_text(&harness.view_data.dashboard);
        assert!(text.contains("signed in: Ana Reyes (areyes)"));
        assert!(text.contains("released: 4"));
        assert!(text.contains("terminal: 0"));

        harness.press(&mut runtime, '/');
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.status(), Some("nothing to search here"));
    }

    #[test]
    fn failed_refresh_reports_the_error() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);
        runtime.fail_loads = true;

        harness.press(&mut runtime, 'r');
        assert_eq!(harness.status(), Some("load failed: session expired"));
        assert_eq!(harness.document_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::new(ScreenKind::Dashboard, &mut runtime);
        let (tx, rx) = mpsc::channel();

        emit_status(&mut harness.state, &mut harness.view_data, &tx, "first");
        emit_status(&mut harness.state, &mut harness.view_data, &tx, "second");
        tx.send(InternalEvent::ClearStatus { token: 1 }).expect("send");
        process_internal_events(&mut harness.state, &mut harness.view_data, &rx);
        assert_eq!(harness.status(), Some("second"));

        tx.send(InternalEvent::ClearStatus { token: 2 }).expect("send");
        process_internal_events(&mut harness.state, &mut harness.view_data, &rx);
        assert_eq!(harness.status(), None);
    }

    #[test]
    fn help_overlay_hides_status_bar() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::new(ScreenKind::Dashboard, &mut runtime);

        harness.press(&mut runtime, '?');
        assert!(harness.view_data.help_visible);
        assert!(status_text(&harness.state, &harness.view_data).is_empty());
        assert!(help_overlay_text().contains("P print series"));

        harness.press(&mut runtime, '?');
        assert!(!harness.view_data.help_visible);
        assert!(status_text(&harness.state, &harness.view_data).starts_with("NAV | help hidden"));
    }

    #[test]
    fn switching_screens_loads_their_rows() {
        let mut runtime = TestRuntime::with_documents(sample_documents());
        runtime.users = OfficeFaker::new(2).users(4);
        let mut harness = Harness::new(ScreenKind::Documents, &mut runtime);

        harness.code(&mut runtime, KeyCode::Tab);
        assert_eq!(harness.state.active_screen, ScreenKind::Users);
        assert_eq!(harness.view_data.users.rows().len(), 4);
        assert_eq!(harness.view_data.users.projection(0).rows.len(), 4);
    }
}
