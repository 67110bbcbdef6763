use serde::{Deserialize, Serialize};
use std::fmt;

use crate::google::a1::CellRange;
use crate::google::types::GridRange;

/// A non-empty, trimmed class name; also the title of its class sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    /// Trim the raw cell text; blank input is not a class
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ClassName(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comparison key; sheet titles in a workbook are unique regardless of case
    pub fn key(&self) -> String {
        name_key(&self.0)
    }
}

/// Trimmed, lowercased form of a sheet or class name
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A region that stays editable when a class sheet is protected.
///
/// Stored in configuration as A1 text (`"A7:R70"`, `"1:6"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EditableRegion(CellRange);

impl EditableRegion {
    pub fn parse(a1: &str) -> crate::error::Result<Self> {
        CellRange::parse(a1).map(EditableRegion)
    }

    pub fn to_grid_range(&self, sheet_id: i64) -> GridRange {
        self.0.to_grid_range(sheet_id)
    }
}

impl TryFrom<String> for EditableRegion {
    type Error = crate::error::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EditableRegion::parse(&value)
    }
}

impl From<EditableRegion> for String {
    fn from(region: EditableRegion) -> Self {
        region.0.to_string()
    }
}

/// The six regions every class sheet keeps editable
pub const CLASS_SHEET_EDITABLE_REGIONS: [&str; 6] =
    ["A7:R70", "AX7:AX70", "AA7:AA70", "W7:X70", "AZ7:BB70", "1:6"];

pub fn default_editable_regions() -> Vec<EditableRegion> {
    CLASS_SHEET_EDITABLE_REGIONS
        .iter()
        .filter_map(|a1| EditableRegion::parse(a1).ok())
        .collect()
}

/// A class sheet made by one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSheet {
    pub name: ClassName,
    pub sheet_id: i64,
}

/// Result of a class-sheet creation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClassesOutcome {
    /// Sheets created this run, in roster order
    pub created: Vec<CreatedSheet>,
    /// Roster entries that already had a sheet
    pub existing: Vec<ClassName>,
}

impl CreateClassesOutcome {
    pub fn nothing_created(&self) -> bool {
        self.created.is_empty()
    }
}

/// Result of removing or re-applying protections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtectionOutcome {
    /// Sheets touched
    pub sheets: Vec<String>,
    /// Protected ranges deleted
    pub removed: usize,
    /// Protected ranges added
    pub added: usize,
}
