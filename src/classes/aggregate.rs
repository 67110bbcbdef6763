//! Housekeeping around class-sheet creation: preparing the control sheet and
//! refreshing the consolidated QUERY formula that stacks every class sheet.

use serde_json::Value;

use super::types::ClassName;
use crate::config::AggregateConfig;
use crate::error::Result;
use crate::google::a1::{quote_sheet_name, sheet_range};
use crate::google::{SheetsApi, ValueInputOption, ValueRange};

/// Steps the orchestrator runs before and after creating sheets
#[allow(async_fn_in_trait)]
pub trait ClassSheetHooks {
    async fn prepare_control_sheet(&self, spreadsheet_id: &str) -> Result<()>;

    /// Called on every run, including runs that created nothing
    async fn refresh_aggregate(&self, spreadsheet_id: &str, class_sheets: &[ClassName]) -> Result<()>;
}

/// `=QUERY({'A'!r;'B'!r};"select * where Col1 is not null";0)`
///
/// `separator` goes between the QUERY arguments. Ranges inside the array
/// literal are always stacked with `;`, which means "next row" in every locale.
pub fn aggregate_formula(class_sheets: &[ClassName], source_range: &str, separator: &str) -> String {
    if class_sheets.is_empty() {
        return String::new();
    }
    let stacked = class_sheets
        .iter()
        .map(|name| format!("{}!{}", quote_sheet_name(name.as_str()), source_range))
        .collect::<Vec<_>>()
        .join(";");
    format!(
        "=QUERY({{{stacked}}}{separator}\"select * where Col1 is not null\"{separator}0)"
    )
}

/// Hooks backed by the Sheets API
pub struct WorkbookHooks<'a, S> {
    sheets: &'a S,
    aggregate: Option<&'a AggregateConfig>,
}

impl<'a, S: SheetsApi> WorkbookHooks<'a, S> {
    pub fn new(sheets: &'a S, aggregate: Option<&'a AggregateConfig>) -> Self {
        Self { sheets, aggregate }
    }
}

impl<S: SheetsApi> ClassSheetHooks for WorkbookHooks<'_, S> {
    async fn prepare_control_sheet(&self, spreadsheet_id: &str) -> Result<()> {
        // Row clearing on the control sheet is done by the workbook's own scripts
        log::debug!("[prepare_control_sheet] nothing to prepare for {}", spreadsheet_id);
        Ok(())
    }

    async fn refresh_aggregate(&self, spreadsheet_id: &str, class_sheets: &[ClassName]) -> Result<()> {
        let Some(aggregate) = self.aggregate else {
            log::debug!("[refresh_aggregate] no aggregate sheet configured");
            return Ok(());
        };

        let formula = aggregate_formula(class_sheets, &aggregate.source_range, &aggregate.separator);
        let target = sheet_range(&aggregate.sheet, &aggregate.cell);
        self.sheets
            .batch_update_values(
                spreadsheet_id,
                ValueInputOption::UserEntered,
                vec![ValueRange::single(target.clone(), Value::String(formula))],
            )
            .await?;

        log::info!(
            "[refresh_aggregate] {} now stacks {} class sheet(s)",
            target,
            class_sheets.len()
        );
        Ok(())
    }
}
