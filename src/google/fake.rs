//! In-memory Sheets/Drive backend for tests.
//!
//! Batch updates are applied to a copy of the spreadsheet and committed only
//! when every request succeeds, mirroring the host's all-or-nothing batches.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use super::a1::{split_sheet_range, CellAddress, CellRange};
use super::api::{DriveApi, SheetsApi};
use super::types::*;
use crate::error::{Error, Result};

const DEFAULT_ROWS: u32 = 1000;
const DEFAULT_COLUMNS: u32 = 26;

#[derive(Debug, Clone, Default)]
pub struct FakeSheet {
    pub sheet: Sheet,
    pub cells: BTreeMap<(u32, u32), Value>,
    pub copied_rows: Vec<Value>,
    pub row_sizes: BTreeMap<u32, u32>,
    pub column_sizes: BTreeMap<u32, u32>,
}

impl FakeSheet {
    pub fn title(&self) -> &str {
        self.sheet.properties.title()
    }

    pub fn id(&self) -> i64 {
        self.sheet.properties.sheet_id
    }

    pub fn index(&self) -> u32 {
        self.sheet.properties.index.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
struct FakeBook {
    title: String,
    sheets: Vec<FakeSheet>,
    next_sheet_id: i64,
    next_protection_id: i64,
}

impl FakeBook {
    fn sheet_by_title(&self, title: &str) -> Option<&FakeSheet> {
        self.sheets.iter().find(|s| s.title() == title)
    }

    fn sheet_by_title_mut(&mut self, title: &str) -> Option<&mut FakeSheet> {
        self.sheets.iter_mut().find(|s| s.title() == title)
    }

    fn sheet_by_id_mut(&mut self, id: i64) -> Result<&mut FakeSheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| bad_request(format!("No grid with id: {}", id)))
    }

    fn push_sheet(&mut self, title: &str) -> i64 {
        let id = self.next_sheet_id;
        self.next_sheet_id += 1;
        let index = self.sheets.len() as u32;
        self.sheets.push(FakeSheet {
            sheet: Sheet {
                properties: SheetProperties {
                    sheet_id: id,
                    title: Some(title.to_string()),
                    index: Some(index),
                    hidden: Some(false),
                    grid_properties: Some(GridProperties {
                        row_count: DEFAULT_ROWS,
                        column_count: DEFAULT_COLUMNS,
                    }),
                },
                ..Default::default()
            },
            ..Default::default()
        });
        id
    }

    fn sorted(&mut self) {
        self.sheets.sort_by_key(|s| s.index());
        for (i, sheet) in self.sheets.iter_mut().enumerate() {
            sheet.sheet.properties.index = Some(i as u32);
        }
    }

    fn apply(&mut self, request: &Request) -> Result<Reply> {
        match request {
            Request::DuplicateSheet(dup) => {
                if self
                    .sheets
                    .iter()
                    .any(|s| s.title().eq_ignore_ascii_case(&dup.new_sheet_name))
                {
                    return Err(bad_request(format!(
                        "A sheet with the name \"{}\" already exists. Please enter another name.",
                        dup.new_sheet_name
                    )));
                }
                let source = self
                    .sheets
                    .iter()
                    .find(|s| s.id() == dup.source_sheet_id)
                    .cloned()
                    .ok_or_else(|| bad_request(format!("No grid with id: {}", dup.source_sheet_id)))?;

                let id = self.next_sheet_id;
                self.next_sheet_id += 1;
                for sheet in self.sheets.iter_mut() {
                    if sheet.index() >= dup.insert_sheet_index {
                        sheet.sheet.properties.index = Some(sheet.index() + 1);
                    }
                }

                let mut copy = source;
                copy.sheet.properties.sheet_id = id;
                copy.sheet.properties.title = Some(dup.new_sheet_name.clone());
                copy.sheet.properties.index = Some(dup.insert_sheet_index.min(self.sheets.len() as u32));
                copy.sheet.protected_ranges.clear();
                let properties = copy.sheet.properties.clone();
                self.sheets.push(copy);
                self.sorted();

                let properties = SheetProperties {
                    index: self
                        .sheets
                        .iter()
                        .find(|s| s.id() == id)
                        .and_then(|s| s.sheet.properties.index),
                    ..properties
                };
                Ok(Reply {
                    duplicate_sheet: Some(SheetReply { properties }),
                    ..Default::default()
                })
            }
            Request::UpdateSheetProperties(update) => {
                let sheet = self.sheet_by_id_mut(update.properties.sheet_id)?;
                for field in update.fields.split(',').map(str::trim) {
                    match field {
                        "hidden" => sheet.sheet.properties.hidden = update.properties.hidden,
                        "title" => sheet.sheet.properties.title = update.properties.title.clone(),
                        other => return Err(bad_request(format!("Unsupported field: {}", other))),
                    }
                }
                Ok(Reply::default())
            }
            Request::AddProtectedRange(add) => {
                let id = self.next_protection_id;
                self.next_protection_id += 1;
                let mut protected_range = add.protected_range.clone();
                protected_range.protected_range_id = Some(id);
                let sheet = self.sheet_by_id_mut(protected_range.range.sheet_id)?;
                sheet.sheet.protected_ranges.push(protected_range.clone());
                Ok(Reply {
                    add_protected_range: Some(ProtectedRangeReply { protected_range }),
                    ..Default::default()
                })
            }
            Request::DeleteProtectedRange(delete) => {
                let found = self.sheets.iter_mut().any(|s| {
                    let before = s.sheet.protected_ranges.len();
                    s.sheet
                        .protected_ranges
                        .retain(|p| p.protected_range_id != Some(delete.protected_range_id));
                    before != s.sheet.protected_ranges.len()
                });
                if !found {
                    return Err(bad_request(format!(
                        "No protected range with id: {}",
                        delete.protected_range_id
                    )));
                }
                Ok(Reply::default())
            }
            Request::AppendDimension(append) => {
                let sheet = self.sheet_by_id_mut(append.sheet_id)?;
                let grid = sheet.sheet.properties.grid_properties.get_or_insert_with(Default::default);
                match append.dimension {
                    Dimension::Rows => grid.row_count += append.length,
                    Dimension::Columns => grid.column_count += append.length,
                }
                Ok(Reply::default())
            }
            Request::UpdateDimensionProperties(update) => {
                let sheet = self.sheet_by_id_mut(update.range.sheet_id)?;
                let Some(size) = update.properties.pixel_size else {
                    return Ok(Reply::default());
                };
                let target = match update.range.dimension {
                    Dimension::Rows => &mut sheet.row_sizes,
                    Dimension::Columns => &mut sheet.column_sizes,
                };
                for i in update.range.start_index..update.range.end_index {
                    target.insert(i, size);
                }
                Ok(Reply::default())
            }
            Request::UpdateCells(update) => {
                let sheet = self.sheet_by_id_mut(update.start.sheet_id)?;
                let rows_needed = update.start.row_index + update.rows.len() as u32;
                if rows_needed > sheet.sheet.row_count() {
                    return Err(bad_request(format!(
                        "Range exceeds grid limits. Max rows: {}",
                        sheet.sheet.row_count()
                    )));
                }
                sheet.copied_rows = update.rows.clone();
                Ok(Reply::default())
            }
            Request::MergeCells(merge) => {
                let sheet = self.sheet_by_id_mut(merge.range.sheet_id)?;
                sheet.sheet.merges.push(merge.range);
                Ok(Reply::default())
            }
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    user_email: String,
    books: HashMap<String, FakeBook>,
    parents: HashMap<String, Vec<String>>,
    folders: Vec<(String, String, String)>,
    failing_ranges: HashSet<String>,
    fail_batches: bool,
    value_writes: Vec<(String, ValueInputOption)>,
    calls: Vec<String>,
    next_id: u32,
}

pub struct FakeGoogle {
    state: Mutex<FakeState>,
}

fn bad_request(message: String) -> Error {
    Error::Api {
        status: 400,
        message,
    }
}

fn not_found(what: &str) -> Error {
    Error::Api {
        status: 404,
        message: format!("Requested entity was not found: {}", what),
    }
}

impl FakeGoogle {
    pub fn new(user_email: &str) -> Self {
        Self {
            state: Mutex::new(FakeState {
                user_email: user_email.to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn add_spreadsheet(&self, id: &str, title: &str, parent: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.books.insert(
            id.to_string(),
            FakeBook {
                title: title.to_string(),
                ..Default::default()
            },
        );
        if let Some(parent) = parent {
            state.parents.insert(id.to_string(), vec![parent.to_string()]);
        }
    }

    pub fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let book = state.books.get_mut(spreadsheet_id).expect("spreadsheet exists");
        book.push_sheet(title)
    }

    pub fn set_hidden(&self, spreadsheet_id: &str, title: &str, hidden: bool) {
        self.with_sheet(spreadsheet_id, title, |s| s.sheet.properties.hidden = Some(hidden));
    }

    pub fn set_grid_size(&self, spreadsheet_id: &str, title: &str, rows: u32, columns: u32) {
        self.with_sheet(spreadsheet_id, title, |s| {
            s.sheet.properties.grid_properties = Some(GridProperties {
                row_count: rows,
                column_count: columns,
            })
        });
    }

    pub fn set_grid_data(&self, spreadsheet_id: &str, title: &str, data: GridData, merges: Vec<GridRange>) {
        self.with_sheet(spreadsheet_id, title, |s| {
            s.sheet.data = vec![data];
            s.sheet.merges = merges;
        });
    }

    pub fn add_protection(&self, spreadsheet_id: &str, title: &str, range: Option<GridRange>) {
        let mut state = self.state.lock().unwrap();
        let book = state.books.get_mut(spreadsheet_id).expect("spreadsheet exists");
        let id = book.next_protection_id;
        book.next_protection_id += 1;
        let sheet = book.sheet_by_title_mut(title).expect("sheet exists");
        let range = range.unwrap_or_else(|| GridRange::sheet(sheet.id()));
        sheet.sheet.protected_ranges.push(ProtectedRange {
            protected_range_id: Some(id),
            range,
            ..Default::default()
        });
    }

    pub fn set_cell(&self, spreadsheet_id: &str, title: &str, cell: &str, value: Value) {
        let address = CellAddress::parse(cell).expect("valid cell");
        self.with_sheet(spreadsheet_id, title, |s| {
            s.cells.insert((address.row, address.col), value);
        });
    }

    pub fn cell(&self, spreadsheet_id: &str, title: &str, cell: &str) -> Option<Value> {
        let address = CellAddress::parse(cell).expect("valid cell");
        self.sheet(spreadsheet_id, title)
            .and_then(|s| s.cells.get(&(address.row, address.col)).cloned())
    }

    pub fn sheet(&self, spreadsheet_id: &str, title: &str) -> Option<FakeSheet> {
        let state = self.state.lock().unwrap();
        state
            .books
            .get(spreadsheet_id)
            .and_then(|b| b.sheet_by_title(title))
            .cloned()
    }

    pub fn sheet_titles(&self, spreadsheet_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut sheets = state
            .books
            .get(spreadsheet_id)
            .map(|b| b.sheets.clone())
            .unwrap_or_default();
        sheets.sort_by_key(|s| s.index());
        sheets.iter().map(|s| s.title().to_string()).collect()
    }

    /// Spreadsheets created through the API, with their titles
    pub fn created_spreadsheets(&self) -> Vec<(String, String)> {
        let state = self.state.lock().unwrap();
        let mut created: Vec<_> = state
            .books
            .iter()
            .filter(|(id, _)| id.starts_with("created-"))
            .map(|(id, b)| (id.clone(), b.title.clone()))
            .collect();
        created.sort();
        created
    }

    pub fn parents_of(&self, file_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.parents.get(file_id).cloned().unwrap_or_default()
    }

    pub fn add_folder(&self, id: &str, parent: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .folders
            .push((id.to_string(), parent.to_string(), name.to_string()));
    }

    pub fn folders(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().folders.clone()
    }

    /// Make `get_values` fail for this exact range string
    pub fn fail_values_for(&self, range: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_ranges
            .insert(range.to_string());
    }

    /// Make every `batch_update` fail without applying anything
    pub fn fail_batch_updates(&self) {
        self.state.lock().unwrap().fail_batches = true;
    }

    /// Input option used for the last write to this exact range string
    pub fn value_write_option(&self, range: &str) -> Option<ValueInputOption> {
        let state = self.state.lock().unwrap();
        state
            .value_writes
            .iter()
            .rev()
            .find(|(r, _)| r == range)
            .map(|(_, option)| *option)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn with_sheet(&self, spreadsheet_id: &str, title: &str, f: impl FnOnce(&mut FakeSheet)) {
        let mut state = self.state.lock().unwrap();
        let book = state.books.get_mut(spreadsheet_id).expect("spreadsheet exists");
        f(book.sheet_by_title_mut(title).expect("sheet exists"));
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }
}

fn resolve_range<'a>(book: &'a FakeBook, range: &str) -> Result<(&'a FakeSheet, CellRange)> {
    let (sheet, a1) = split_sheet_range(range);
    let sheet = match sheet {
        Some(title) => book
            .sheet_by_title(&title)
            .ok_or_else(|| bad_request(format!("Unable to parse range: {}", range)))?,
        None => book
            .sheets
            .iter()
            .min_by_key(|s| s.index())
            .ok_or_else(|| bad_request(format!("Unable to parse range: {}", range)))?,
    };
    Ok((sheet, CellRange::parse(a1)?))
}

impl SheetsApi for FakeGoogle {
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        self.record("get_spreadsheet");
        let state = self.state.lock().unwrap();
        let book = state.books.get(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;
        let mut sheets: Vec<Sheet> = book
            .sheets
            .iter()
            .map(|s| Sheet {
                properties: s.sheet.properties.clone(),
                protected_ranges: s.sheet.protected_ranges.clone(),
                ..Default::default()
            })
            .collect();
        sheets.sort_by_key(|s| s.properties.index);
        Ok(Spreadsheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            spreadsheet_url: Some(spreadsheet_url(spreadsheet_id)),
            properties: Some(SpreadsheetProperties {
                title: book.title.clone(),
            }),
            sheets,
        })
    }

    async fn get_sheet_grid(&self, spreadsheet_id: &str, sheet_title: &str) -> Result<Option<Sheet>> {
        self.record("get_sheet_grid");
        let state = self.state.lock().unwrap();
        let book = state.books.get(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;
        Ok(book.sheet_by_title(sheet_title).map(|s| s.sheet.clone()))
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateResponse> {
        self.record("batch_update");
        let mut state = self.state.lock().unwrap();
        if state.fail_batches {
            return Err(Error::Api {
                status: 503,
                message: "The service is currently unavailable.".to_string(),
            });
        }
        let book = state.books.get(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;

        let mut working = book.clone();
        let mut replies = Vec::with_capacity(requests.len());
        for (i, request) in requests.iter().enumerate() {
            let reply = working.apply(request).map_err(|e| match e {
                Error::Api { status, message } => Error::Api {
                    status,
                    message: format!("Invalid requests[{}]: {}", i, message),
                },
                other => other,
            })?;
            replies.push(reply);
        }

        state.books.insert(spreadsheet_id.to_string(), working);
        Ok(BatchUpdateResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            replies,
        })
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange> {
        self.record("get_values");
        let state = self.state.lock().unwrap();
        if state.failing_ranges.contains(range) {
            return Err(Error::Api {
                status: 500,
                message: format!("Internal error reading {}", range),
            });
        }
        let book = state.books.get(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;
        let (sheet, cells) = resolve_range(book, range)?;

        let start_row = cells.start_row.unwrap_or(0);
        let end_row = cells.end_row.unwrap_or_else(|| sheet.sheet.row_count());
        let start_col = cells.start_col.unwrap_or(0);
        let end_col = cells.end_col.unwrap_or_else(|| sheet.sheet.column_count());

        // Like the real API: trailing empty rows and cells are omitted
        let mut values: Vec<Vec<Value>> = Vec::new();
        for row in start_row..end_row {
            let mut row_values: Vec<Value> = (start_col..end_col)
                .map(|col| {
                    let value = sheet.cells.get(&(row, col)).cloned().unwrap_or(Value::String(String::new()));
                    match render {
                        ValueRenderOption::FormattedValue => Value::String(value_text(&value)),
                        ValueRenderOption::UnformattedValue => value,
                    }
                })
                .collect();
            while row_values.last().map_or(false, |v| v.as_str() == Some("")) {
                row_values.pop();
            }
            values.push(row_values);
        }
        while values.last().map_or(false, |r| r.is_empty()) {
            values.pop();
        }

        Ok(ValueRange {
            range: range.to_string(),
            major_dimension: Some("ROWS".to_string()),
            values,
        })
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        input: ValueInputOption,
        data: Vec<ValueRange>,
    ) -> Result<()> {
        self.record("batch_update_values");
        let mut state = self.state.lock().unwrap();
        state
            .value_writes
            .extend(data.iter().map(|v| (v.range.clone(), input)));
        let book = state.books.get_mut(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;

        let mut writes = Vec::new();
        for value_range in &data {
            let (sheet, cells) = resolve_range(book, &value_range.range)?;
            let origin = cells.top_left();
            writes.push((sheet.id(), origin, value_range.values.clone()));
        }

        for (sheet_id, origin, values) in writes {
            let sheet = book.sheet_by_id_mut(sheet_id)?;
            for (r, row) in values.into_iter().enumerate() {
                for (c, value) in row.into_iter().enumerate() {
                    sheet
                        .cells
                        .insert((origin.row + r as u32, origin.col + c as u32), value);
                }
            }
        }
        Ok(())
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<Spreadsheet> {
        self.record("create_spreadsheet");
        let id = {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = format!("created-{}", state.next_id);
            let mut book = FakeBook {
                title: title.to_string(),
                ..Default::default()
            };
            book.push_sheet("Sheet1");
            state.books.insert(id.clone(), book);
            state.parents.insert(id.clone(), vec!["root".to_string()]);
            id
        };
        self.get_spreadsheet(&id).await
    }
}

fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit", id)
}

impl DriveApi for FakeGoogle {
    async fn current_user_email(&self) -> Result<String> {
        self.record("current_user_email");
        Ok(self.state.lock().unwrap().user_email.clone())
    }

    async fn file_parents(&self, file_id: &str) -> Result<Vec<String>> {
        self.record("file_parents");
        Ok(self.parents_of(file_id))
    }

    async fn find_folder(&self, parent_id: &str, name: &str) -> Result<Option<String>> {
        self.record("find_folder");
        let state = self.state.lock().unwrap();
        Ok(state
            .folders
            .iter()
            .find(|(_, parent, folder)| parent == parent_id && folder == name)
            .map(|(id, _, _)| id.clone()))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<String> {
        self.record("create_folder");
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("folder-{}", state.next_id);
        state
            .folders
            .push((id.clone(), parent_id.to_string(), name.to_string()));
        Ok(id)
    }

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<()> {
        self.record("move_file");
        let mut state = self.state.lock().unwrap();
        state
            .parents
            .insert(file_id.to_string(), vec![folder_id.to_string()]);
        Ok(())
    }
}
