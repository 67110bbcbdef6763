use super::aggregate::ClassSheetHooks;
use super::batch::{duplicate_sheets, protect_sheets, write_labels};
use super::index::SheetIndex;
use super::roster::{missing_classes, read_roster};
use super::types::{CreateClassesOutcome, CreatedSheet};
use crate::config::ClassSheetsConfig;
use crate::context::ActiveContext;
use crate::error::{Error, Result};
use crate::google::SheetsApi;
use crate::notify::Notifier;

/// Create, protect and label a sheet for every roster class that has none.
///
/// Existing class sheets are left untouched. The aggregate formula is
/// refreshed whether or not anything was created. Failures are shown to the
/// user and returned.
pub async fn create_class_sheets<S, H, N>(
    sheets: &S,
    hooks: &H,
    notifier: &N,
    context: &ActiveContext,
    config: &ClassSheetsConfig,
) -> Result<CreateClassesOutcome>
where
    S: SheetsApi,
    H: ClassSheetHooks,
    N: Notifier,
{
    match run(sheets, hooks, context, config).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            log::error!("[create_class_sheets] {}", e);
            notifier.alert(&e.to_string());
            Err(e)
        }
    }
}

async fn run<S, H>(
    sheets: &S,
    hooks: &H,
    context: &ActiveContext,
    config: &ClassSheetsConfig,
) -> Result<CreateClassesOutcome>
where
    S: SheetsApi,
    H: ClassSheetHooks,
{
    let spreadsheet_id = context.spreadsheet_id.as_str();

    hooks.prepare_control_sheet(spreadsheet_id).await?;

    let index = SheetIndex::load(sheets, spreadsheet_id).await?;
    let template_id = index
        .get(&config.template_sheet)
        .map(|s| s.properties.sheet_id)
        .ok_or_else(|| Error::TemplateSheetMissing(config.template_sheet.clone()))?;

    let roster = read_roster(
        sheets,
        spreadsheet_id,
        &index,
        &config.control_sheet,
        &config.roster_range,
    )
    .await?;
    let to_create = missing_classes(&roster, &index);
    let existing = roster
        .iter()
        .filter(|name| !to_create.contains(name))
        .cloned()
        .collect();

    if to_create.is_empty() {
        log::info!("[create_class_sheets] no new class to create");
        hooks.refresh_aggregate(spreadsheet_id, &roster).await?;
        return Ok(CreateClassesOutcome {
            created: Vec::new(),
            existing,
        });
    }

    log::info!("[create_class_sheets] creating {} class sheet(s) in batch", to_create.len());

    let start = index.insertion_index_after(&config.template_sheet);
    let ids = duplicate_sheets(sheets, spreadsheet_id, template_id, &to_create, start).await?;
    protect_sheets(
        sheets,
        spreadsheet_id,
        &ids,
        &config.editable_regions,
        &context.user_email,
    )
    .await?;
    write_labels(sheets, spreadsheet_id, &to_create, &config.label_cell).await?;
    hooks.refresh_aggregate(spreadsheet_id, &roster).await?;

    log::info!("[create_class_sheets] {} class sheet(s) created", to_create.len());

    let created = to_create
        .into_iter()
        .zip(ids)
        .map(|(name, sheet_id)| CreatedSheet { name, sheet_id })
        .collect();

    Ok(CreateClassesOutcome { created, existing })
}
