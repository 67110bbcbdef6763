use std::collections::HashSet;

use super::index::SheetIndex;
use super::types::ClassName;
use crate::error::Result;
use crate::google::a1::sheet_range;
use crate::google::{value_text, SheetsApi, ValueRange, ValueRenderOption};

/// Read the class names listed on the control sheet.
///
/// A missing control sheet yields an empty roster, which callers treat as
/// nothing to do.
pub async fn read_roster<S: SheetsApi>(
    sheets: &S,
    spreadsheet_id: &str,
    index: &SheetIndex,
    control_sheet: &str,
    range: &str,
) -> Result<Vec<ClassName>> {
    if !index.contains(control_sheet) {
        log::warn!("[read_roster] control sheet '{}' not found", control_sheet);
        return Ok(Vec::new());
    }

    let values = sheets
        .get_values(
            spreadsheet_id,
            &sheet_range(control_sheet, range),
            ValueRenderOption::FormattedValue,
        )
        .await?;
    let roster = roster_from_values(&values);
    log::info!("[read_roster] {} class(es) listed on '{}'", roster.len(), control_sheet);
    Ok(roster)
}

/// Non-blank trimmed names, top to bottom; the first spelling of a name wins
/// over later entries differing only in case
pub fn roster_from_values(values: &ValueRange) -> Vec<ClassName> {
    let mut seen = HashSet::new();
    values
        .values
        .iter()
        .flatten()
        .filter_map(|v| ClassName::parse(&value_text(v)))
        .filter(|name| seen.insert(name.key()))
        .collect()
}

/// Roster entries without a sheet yet, in roster order
pub fn missing_classes(roster: &[ClassName], index: &SheetIndex) -> Vec<ClassName> {
    roster
        .iter()
        .filter(|name| !index.contains(name.as_str()))
        .cloned()
        .collect()
}
