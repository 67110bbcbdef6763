use std::collections::HashMap;

use super::types::name_key;
use crate::error::Result;
use crate::google::{Sheet, SheetsApi, Spreadsheet};

/// Name → sheet lookup over one snapshot of a workbook
#[derive(Debug, Clone, Default)]
pub struct SheetIndex {
    by_name: HashMap<String, usize>,
    sheets: Vec<Sheet>,
}

impl SheetIndex {
    /// Index the sheets of a spreadsheet in tab order, keyed by trimmed title
    /// without regard to case
    pub fn build(spreadsheet: &Spreadsheet) -> Self {
        let mut sheets = spreadsheet.sheets.clone();
        sheets.sort_by_key(|s| s.properties.index.unwrap_or(0));

        let mut by_name = HashMap::with_capacity(sheets.len());
        for (position, sheet) in sheets.iter().enumerate() {
            by_name.insert(name_key(sheet.properties.title()), position);
        }

        Self { by_name, sheets }
    }

    pub async fn load<S: SheetsApi>(sheets: &S, spreadsheet_id: &str) -> Result<Self> {
        let spreadsheet = sheets.get_spreadsheet(spreadsheet_id).await?;
        Ok(Self::build(&spreadsheet))
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.by_name.get(&name_key(name)).map(|&i| &self.sheets[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name_key(name))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Sheets in tab order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Zero-based position right after `template`, or the end when it is absent
    pub fn insertion_index_after(&self, template: &str) -> u32 {
        match self.by_name.get(&name_key(template)) {
            Some(&position) => position as u32 + 1,
            None => self.sheets.len() as u32,
        }
    }
}
