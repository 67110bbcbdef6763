//! The three batched steps of class-sheet creation. Each step is a single
//! API round-trip regardless of how many classes are involved.

use serde_json::Value;

use super::types::{ClassName, EditableRegion};
use crate::error::{Error, Result};
use crate::google::a1::sheet_range;
use crate::google::{
    AddProtectedRangeRequest, DuplicateSheetRequest, Editors, GridRange, ProtectedRange, Request,
    SheetProperties, SheetsApi, UpdateSheetPropertiesRequest, ValueInputOption, ValueRange,
};

/// One `duplicateSheet` per name, at consecutive positions from `start_index`
pub fn duplicate_requests(template_sheet_id: i64, names: &[ClassName], start_index: u32) -> Vec<Request> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Request::DuplicateSheet(DuplicateSheetRequest {
                source_sheet_id: template_sheet_id,
                insert_sheet_index: start_index + i as u32,
                new_sheet_name: name.as_str().to_string(),
            })
        })
        .collect()
}

/// Duplicate the template once per name in a single batch.
///
/// Returns the new sheet ids aligned with `names`. The host rejects the whole
/// batch if any duplicate fails, e.g. on a name collision.
pub async fn duplicate_sheets<S: SheetsApi>(
    sheets: &S,
    spreadsheet_id: &str,
    template_sheet_id: i64,
    names: &[ClassName],
    start_index: u32,
) -> Result<Vec<i64>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let requests = duplicate_requests(template_sheet_id, names, start_index);
    log::debug!("[duplicate_sheets] sending {} duplicateSheet request(s)", requests.len());
    let response = sheets.batch_update(spreadsheet_id, requests).await?;

    let ids = (0..names.len())
        .map(|i| {
            response
                .replies
                .get(i)
                .and_then(|r| r.duplicate_sheet.as_ref())
                .map(|d| d.properties.sheet_id)
                .ok_or(Error::MissingReply {
                    index: i,
                    kind: "duplicateSheet",
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ids)
}

/// Whole-sheet protection with the editable regions cut out and one editor
pub fn class_protection(sheet_id: i64, regions: &[EditableRegion], editor: &str) -> ProtectedRange {
    ProtectedRange {
        protected_range_id: None,
        range: GridRange::sheet(sheet_id),
        description: None,
        warning_only: None,
        unprotected_ranges: regions.iter().map(|r| r.to_grid_range(sheet_id)).collect(),
        editors: Some(Editors {
            users: vec![editor.to_string()],
            ..Default::default()
        }),
    }
}

/// Unhide + protect requests for each sheet, in sheet order
pub fn protection_requests(sheet_ids: &[i64], regions: &[EditableRegion], editor: &str) -> Vec<Request> {
    let mut requests = Vec::with_capacity(sheet_ids.len() * 2);
    for &sheet_id in sheet_ids {
        requests.push(Request::UpdateSheetProperties(UpdateSheetPropertiesRequest {
            properties: SheetProperties {
                sheet_id,
                hidden: Some(false),
                ..Default::default()
            },
            fields: "hidden".to_string(),
        }));
        requests.push(Request::AddProtectedRange(AddProtectedRangeRequest {
            protected_range: class_protection(sheet_id, regions, editor),
        }));
    }
    requests
}

/// Make the new sheets visible and lock them to `editor`, in one batch
pub async fn protect_sheets<S: SheetsApi>(
    sheets: &S,
    spreadsheet_id: &str,
    sheet_ids: &[i64],
    regions: &[EditableRegion],
    editor: &str,
) -> Result<usize> {
    let requests = protection_requests(sheet_ids, regions, editor);
    if requests.is_empty() {
        return Ok(0);
    }

    log::debug!("[protect_sheets] sending {} request(s)", requests.len());
    sheets.batch_update(spreadsheet_id, requests).await?;
    Ok(sheet_ids.len())
}

/// Write each class name into the label cell of its own sheet, literally
pub async fn write_labels<S: SheetsApi>(
    sheets: &S,
    spreadsheet_id: &str,
    names: &[ClassName],
    label_cell: &str,
) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }

    let data = names
        .iter()
        .map(|name| {
            ValueRange::single(
                sheet_range(name.as_str(), label_cell),
                Value::String(name.as_str().to_string()),
            )
        })
        .collect();

    sheets
        .batch_update_values(spreadsheet_id, ValueInputOption::Raw, data)
        .await
}
