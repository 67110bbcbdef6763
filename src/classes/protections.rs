//! Maintenance of class-sheet protections after creation.

use super::batch::protection_requests;
use super::index::SheetIndex;
use super::roster::read_roster;
use super::types::{ClassName, ProtectionOutcome};
use crate::config::ClassSheetsConfig;
use crate::context::ActiveContext;
use crate::error::Result;
use crate::google::{DeleteProtectedRangeRequest, Request, SheetsApi};
use crate::notify::Notifier;

/// Delete whole-sheet protections for `names`; range protections are kept
pub fn removal_requests(index: &SheetIndex, names: &[ClassName]) -> (Vec<Request>, Vec<String>) {
    let mut requests = Vec::new();
    let mut touched = Vec::new();
    for name in names {
        let Some(sheet) = index.get(name.as_str()) else {
            continue;
        };
        let ids: Vec<i64> = sheet
            .protected_ranges
            .iter()
            .filter(|p| p.range.is_whole_sheet())
            .filter_map(|p| p.protected_range_id)
            .collect();
        if ids.is_empty() {
            continue;
        }
        touched.push(name.as_str().to_string());
        requests.extend(ids.into_iter().map(|protected_range_id| {
            Request::DeleteProtectedRange(DeleteProtectedRangeRequest { protected_range_id })
        }));
    }
    (requests, touched)
}

async fn remove_in<S: SheetsApi>(
    sheets: &S,
    spreadsheet_id: &str,
    index: &SheetIndex,
    names: &[ClassName],
) -> Result<ProtectionOutcome> {
    let (requests, touched) = removal_requests(index, names);
    let removed = requests.len();
    if removed > 0 {
        sheets.batch_update(spreadsheet_id, requests).await?;
    }
    log::info!(
        "[remove_protections] removed {} protection(s) from {} sheet(s)",
        removed,
        touched.len()
    );
    Ok(ProtectionOutcome {
        sheets: touched,
        removed,
        added: 0,
    })
}

/// Unlock every class sheet listed in the cleanup range of the control sheet
pub async fn remove_protections<S: SheetsApi, N: Notifier>(
    sheets: &S,
    notifier: &N,
    context: &ActiveContext,
    config: &ClassSheetsConfig,
) -> Result<ProtectionOutcome> {
    remove_listed(sheets, context, config).await.map_err(|e| {
        log::error!("[remove_protections] {}", e);
        notifier.alert(&e.to_string());
        e
    })
}

async fn remove_listed<S: SheetsApi>(
    sheets: &S,
    context: &ActiveContext,
    config: &ClassSheetsConfig,
) -> Result<ProtectionOutcome> {
    let index = SheetIndex::load(sheets, &context.spreadsheet_id).await?;
    let names = read_roster(
        sheets,
        &context.spreadsheet_id,
        &index,
        &config.control_sheet,
        &config.cleanup_range,
    )
    .await?;
    remove_in(sheets, &context.spreadsheet_id, &index, &names).await
}

/// Replace the protection of every existing roster class sheet with a fresh
/// one owned by the invoking user
pub async fn reprotect_class_sheets<S: SheetsApi, N: Notifier>(
    sheets: &S,
    notifier: &N,
    context: &ActiveContext,
    config: &ClassSheetsConfig,
) -> Result<ProtectionOutcome> {
    reprotect_roster(sheets, context, config).await.map_err(|e| {
        log::error!("[reprotect_class_sheets] {}", e);
        notifier.alert(&e.to_string());
        e
    })
}

async fn reprotect_roster<S: SheetsApi>(
    sheets: &S,
    context: &ActiveContext,
    config: &ClassSheetsConfig,
) -> Result<ProtectionOutcome> {
    let spreadsheet_id = context.spreadsheet_id.as_str();
    let index = SheetIndex::load(sheets, spreadsheet_id).await?;
    let roster = read_roster(
        sheets,
        spreadsheet_id,
        &index,
        &config.control_sheet,
        &config.roster_range,
    )
    .await?;

    let (mut requests, touched) = removal_requests(&index, &roster);
    let removed = requests.len();

    let present: Vec<(&ClassName, i64)> = roster
        .iter()
        .filter_map(|n| index.get(n.as_str()).map(|s| (n, s.properties.sheet_id)))
        .collect();
    let ids: Vec<i64> = present.iter().map(|&(_, id)| id).collect();
    requests.extend(protection_requests(
        &ids,
        &config.editable_regions,
        &context.user_email,
    ));

    // One batch: on failure every old protection stays in place
    if !requests.is_empty() {
        sheets.batch_update(spreadsheet_id, requests).await?;
    }
    log::debug!("[reprotect_class_sheets] cleared {} sheet(s)", touched.len());

    let outcome = ProtectionOutcome {
        sheets: present.iter().map(|(n, _)| n.as_str().to_string()).collect(),
        removed,
        added: ids.len(),
    };
    log::info!("[reprotect_class_sheets] {} sheet(s) protected", outcome.added);
    Ok(outcome)
}
