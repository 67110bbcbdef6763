//! Replicate a template sheet into a new spreadsheet filed next to the active
//! workbook, then carry the student's mapped fields over from the active sheet.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::folder::resolve_or_create_folder;
use super::naming::{format_timestamp, replica_title};
use super::types::{FieldWarning, ReplicaOutcome};
use crate::config::ReplicaConfig;
use crate::context::ActiveContext;
use crate::error::{Error, Result};
use crate::google::a1::sheet_range;
use crate::google::{
    value_text, AppendDimensionRequest, Dimension, DimensionProperties, DimensionRange, DriveApi,
    GridCoordinate, GridRange, MergeCellsRequest, Request, Sheet, SheetProperties, SheetsApi,
    UpdateCellsRequest, UpdateDimensionPropertiesRequest, UpdateSheetPropertiesRequest,
    ValueInputOption, ValueRange, ValueRenderOption,
};
use crate::notify::Notifier;

/// Create a replica of the configured template for the student on the
/// active sheet.
///
/// Field copies are best effort and come back as warnings. Any other
/// failure is shown to the user and returned.
pub async fn replicate_sheet<S, D, N>(
    sheets: &S,
    drive: &D,
    notifier: &N,
    context: &ActiveContext,
    config: &ReplicaConfig,
    now: DateTime<Utc>,
) -> Result<ReplicaOutcome>
where
    S: SheetsApi,
    D: DriveApi,
    N: Notifier,
{
    log::info!("[replicate_sheet] starting from {}", context.spreadsheet_id);

    match run(sheets, drive, notifier, context, config, now).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            log::error!("[replicate_sheet] {}", e);
            notifier.alert(&format!("Error generating {}: {}", config.folder_name, e));
            Err(e)
        }
    }
}

async fn run<S, D, N>(
    sheets: &S,
    drive: &D,
    notifier: &N,
    context: &ActiveContext,
    config: &ReplicaConfig,
    now: DateTime<Utc>,
) -> Result<ReplicaOutcome>
where
    S: SheetsApi,
    D: DriveApi,
    N: Notifier,
{
    let active_sheet = context
        .active_sheet
        .as_deref()
        .ok_or_else(|| Error::Config("No active sheet selected".to_string()))?;

    let folder_id = resolve_or_create_folder(drive, &context.spreadsheet_id, &config.folder_name).await?;

    let template = sheets
        .get_sheet_grid(&config.template_spreadsheet_id, &config.template_sheet)
        .await?
        .ok_or_else(|| Error::TemplateNotFound {
            spreadsheet_id: config.template_spreadsheet_id.clone(),
            sheet: config.template_sheet.clone(),
        })?;

    let id_cell = config
        .fields
        .get(&config.id_field)
        .ok_or_else(|| Error::UnmappedField(config.id_field.clone()))?;
    let student_id = read_cell(sheets, &context.spreadsheet_id, active_sheet, id_cell).await?;
    if student_id.is_empty() {
        return Err(Error::EmptyField {
            field: config.id_field.clone(),
            cell: id_cell.to_string(),
        });
    }
    let student_name = match config.fields.get(&config.name_field) {
        Some(cell) => read_cell(sheets, &context.spreadsheet_id, active_sheet, cell).await?,
        None => String::new(),
    };
    log::info!("[replicate_sheet] student id: {}, name: {}", student_id, student_name);

    let timestamp = format_timestamp(now, config.utc_offset_minutes, &config.timestamp_format)?;
    let title = replica_title(&config.title_prefix, &student_id, &timestamp);
    let created = sheets.create_spreadsheet(&title).await?;
    let target = created
        .sheets
        .first()
        .map(|s| s.properties.clone())
        .ok_or(Error::MissingReply {
            index: 0,
            kind: "sheet",
        })?;
    drive.move_file(&created.spreadsheet_id, &folder_id).await?;
    log::info!("[replicate_sheet] created '{}' ({})", title, created.spreadsheet_id);

    let layout = layout_requests(&template, &target, &config.template_sheet);
    sheets.batch_update(&created.spreadsheet_id, layout).await?;

    let content = content_requests(&template, target.sheet_id);
    if !content.is_empty() {
        sheets.batch_update(&created.spreadsheet_id, content).await?;
    }

    let mut warnings = Vec::new();
    for (field, cell) in config.fields.iter() {
        if let Err(e) = copy_field(
            sheets,
            &context.spreadsheet_id,
            active_sheet,
            &created.spreadsheet_id,
            &config.template_sheet,
            cell,
        )
        .await
        {
            log::warn!("[replicate_sheet] failed to copy field '{}' ({}): {}", field, cell, e);
            warnings.push(FieldWarning {
                field: field.to_string(),
                cell: cell.to_string(),
                message: e.to_string(),
            });
        }
    }

    let url = created
        .spreadsheet_url
        .clone()
        .unwrap_or_else(|| format!("https://docs.google.com/spreadsheets/d/{}/edit", created.spreadsheet_id));

    notifier.toast(
        &format!("{} generated for: {}", config.folder_name, student_name),
        "Success",
    );
    notifier.show_link(
        &format!("{} created", config.folder_name),
        &format!("The {} for {} was created.", config.folder_name, student_name),
        &url,
    );

    Ok(ReplicaOutcome {
        spreadsheet_id: created.spreadsheet_id,
        title,
        url,
        warnings,
    })
}

async fn read_cell<S: SheetsApi>(sheets: &S, spreadsheet_id: &str, sheet: &str, cell: &str) -> Result<String> {
    let values = sheets
        .get_values(spreadsheet_id, &sheet_range(sheet, cell), ValueRenderOption::FormattedValue)
        .await?;
    Ok(values.first().map(value_text).unwrap_or_default().trim().to_string())
}

async fn copy_field<S: SheetsApi>(
    sheets: &S,
    source_id: &str,
    source_sheet: &str,
    target_id: &str,
    target_sheet: &str,
    cell: &str,
) -> Result<()> {
    let values = sheets
        .get_values(
            source_id,
            &sheet_range(source_sheet, cell),
            ValueRenderOption::UnformattedValue,
        )
        .await?;
    let value = values.first().cloned().unwrap_or(Value::String(String::new()));
    // Typed value written literally, so text never turns into a number or formula
    sheets
        .batch_update_values(
            target_id,
            ValueInputOption::Raw,
            vec![ValueRange::single(sheet_range(target_sheet, cell), value)],
        )
        .await
}

/// Rename the target sheet, grow it to the template's extents and copy the
/// template's column widths and row heights
pub fn layout_requests(template: &Sheet, target: &SheetProperties, title: &str) -> Vec<Request> {
    let sheet_id = target.sheet_id;
    let mut requests = vec![Request::UpdateSheetProperties(UpdateSheetPropertiesRequest {
        properties: SheetProperties {
            sheet_id,
            title: Some(title.to_string()),
            ..Default::default()
        },
        fields: "title".to_string(),
    })];

    let (rows, columns) = target
        .grid_properties
        .map(|g| (g.row_count, g.column_count))
        .unwrap_or((0, 0));
    if template.row_count() > rows {
        requests.push(Request::AppendDimension(AppendDimensionRequest {
            sheet_id,
            dimension: Dimension::Rows,
            length: template.row_count() - rows,
        }));
    }
    if template.column_count() > columns {
        requests.push(Request::AppendDimension(AppendDimensionRequest {
            sheet_id,
            dimension: Dimension::Columns,
            length: template.column_count() - columns,
        }));
    }

    for data in &template.data {
        requests.extend(dimension_runs(sheet_id, Dimension::Columns, data.start_column, &data.column_metadata));
        requests.extend(dimension_runs(sheet_id, Dimension::Rows, data.start_row, &data.row_metadata));
    }
    requests
}

/// Cell payloads (`fields = "*"`) and merges of the template
pub fn content_requests(template: &Sheet, sheet_id: i64) -> Vec<Request> {
    let mut requests: Vec<Request> = template
        .data
        .iter()
        .filter(|data| !data.row_data.is_empty())
        .map(|data| {
            Request::UpdateCells(UpdateCellsRequest {
                start: GridCoordinate {
                    sheet_id,
                    row_index: data.start_row,
                    column_index: data.start_column,
                },
                rows: data.row_data.clone(),
                fields: "*".to_string(),
            })
        })
        .collect();

    requests.extend(template.merges.iter().map(|merge| {
        Request::MergeCells(MergeCellsRequest {
            range: GridRange { sheet_id, ..*merge },
            merge_type: "MERGE_ALL".to_string(),
        })
    }));
    requests
}

/// One `updateDimensionProperties` per run of equal pixel sizes
pub fn dimension_runs(
    sheet_id: i64,
    dimension: Dimension,
    offset: u32,
    metadata: &[DimensionProperties],
) -> Vec<Request> {
    let mut requests = Vec::new();
    let mut i = 0;
    while i < metadata.len() {
        let Some(size) = metadata[i].pixel_size else {
            i += 1;
            continue;
        };
        let start = i;
        while i < metadata.len() && metadata[i].pixel_size == Some(size) {
            i += 1;
        }
        requests.push(Request::UpdateDimensionProperties(UpdateDimensionPropertiesRequest {
            range: DimensionRange {
                sheet_id,
                dimension,
                start_index: offset + start as u32,
                end_index: offset + i as u32,
            },
            properties: DimensionProperties {
                pixel_size: Some(size),
                hidden_by_user: None,
            },
            fields: "pixelSize".to_string(),
        }));
    }
    requests
}
