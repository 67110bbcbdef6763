//! Wire types for the subset of the Sheets v4 and Drive v3 APIs used here.
//!
//! Field names follow the REST JSON (camelCase). Optional fields are skipped
//! when serializing so that partial updates only touch what they name.

use serde::{Deserialize, Serialize};

/// A spreadsheet as returned by `spreadsheets.get` or `spreadsheets.create`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: String,
}

/// One sheet (tab) of a spreadsheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub properties: SheetProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protected_ranges: Vec<ProtectedRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<GridData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<GridRange>,
}

impl Sheet {
    pub fn row_count(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .map(|g| g.row_count)
            .unwrap_or(0)
    }

    pub fn column_count(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .map(|g| g.column_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

impl SheetProperties {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
}

/// A rectangle on a sheet; zero-based, end-exclusive. Missing bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// The whole sheet
    pub fn sheet(sheet_id: i64) -> Self {
        GridRange {
            sheet_id,
            ..Default::default()
        }
    }

    pub fn is_whole_sheet(&self) -> bool {
        self.start_row_index.is_none()
            && self.end_row_index.is_none()
            && self.start_column_index.is_none()
            && self.end_column_index.is_none()
    }

    /// Whether the zero-based cell (row, col) falls inside the range
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.start_row_index.map_or(true, |s| row >= s)
            && self.end_row_index.map_or(true, |e| row < e)
            && self.start_column_index.map_or(true, |s| col >= s)
            && self.end_column_index.map_or(true, |e| col < e)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_range_id: Option<i64>,
    pub range: GridRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unprotected_ranges: Vec<GridRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editors: Option<Editors>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_users_can_edit: Option<bool>,
}

/// Cell data for one sheet. Row payloads are kept opaque and copied as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default)]
    pub start_row: u32,
    #[serde(default)]
    pub start_column: u32,
    #[serde(default)]
    pub row_data: Vec<serde_json::Value>,
    #[serde(default)]
    pub row_metadata: Vec<DimensionProperties>,
    #[serde(default)]
    pub column_metadata: Vec<DimensionProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_by_user: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: Dimension,
    pub start_index: u32,
    pub end_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: i64,
    pub row_index: u32,
    pub column_index: u32,
}

// ==================== batchUpdate requests ====================

/// One typed operation of a `spreadsheets.batchUpdate` call.
///
/// Serializes externally tagged, e.g. `{"duplicateSheet": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    DuplicateSheet(DuplicateSheetRequest),
    UpdateSheetProperties(UpdateSheetPropertiesRequest),
    AddProtectedRange(AddProtectedRangeRequest),
    DeleteProtectedRange(DeleteProtectedRangeRequest),
    AppendDimension(AppendDimensionRequest),
    UpdateDimensionProperties(UpdateDimensionPropertiesRequest),
    UpdateCells(UpdateCellsRequest),
    MergeCells(MergeCellsRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSheetRequest {
    pub source_sheet_id: i64,
    pub insert_sheet_index: u32,
    pub new_sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSheetPropertiesRequest {
    pub properties: SheetProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProtectedRangeRequest {
    pub protected_range: ProtectedRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProtectedRangeRequest {
    pub protected_range_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendDimensionRequest {
    pub sheet_id: i64,
    pub dimension: Dimension,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDimensionPropertiesRequest {
    pub range: DimensionRange,
    pub properties: DimensionProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellsRequest {
    pub start: GridCoordinate,
    pub rows: Vec<serde_json::Value>,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCellsRequest {
    pub range: GridRange,
    pub merge_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// One reply per request; requests without a payload answer `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_sheet: Option<SheetReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_protected_range: Option<ProtectedRangeReply>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReply {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedRangeReply {
    pub protected_range: ProtectedRange,
}

// ==================== values ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// A single-cell write
    pub fn single(range: impl Into<String>, value: serde_json::Value) -> Self {
        ValueRange {
            range: range.into(),
            major_dimension: None,
            values: vec![vec![value]],
        }
    }

    /// The top-left value, if the range returned anything
    pub fn first(&self) -> Option<&serde_json::Value> {
        self.values.first().and_then(|row| row.first())
    }
}

/// Display text of a cell value as returned with FORMATTED_VALUE rendering
pub fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How written values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Stored literally, never parsed as formulas
    Raw,
    /// Parsed as if typed by a user
    UserEntered,
}

/// How read values are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRenderOption {
    /// Display text, as the user sees it
    FormattedValue,
    /// Typed values: numbers stay numbers, text stays text
    UnformattedValue,
}

impl ValueRenderOption {
    pub(crate) fn query_value(self) -> &'static str {
        match self {
            ValueRenderOption::FormattedValue => "FORMATTED_VALUE",
            ValueRenderOption::UnformattedValue => "UNFORMATTED_VALUE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: ValueInputOption,
    pub data: Vec<ValueRange>,
}

// ==================== Drive ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveAbout {
    pub user: DriveUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    #[serde(default)]
    pub email_address: String,
}

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
