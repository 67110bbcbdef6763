//! A1 notation helpers: cell addresses, ranges and sheet-qualified ranges.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::google::types::GridRange;

fn cell_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"^\$?([A-Za-z]{1,3})?\$?([0-9]+)?$").expect("valid regex"))
}

/// Convert column index (0-based) to column letters (A, B, ..., Z, AA, AB, ...)
pub fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to a 0-based index
pub fn column_letter_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let value = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        result = result.checked_mul(26)?.checked_add(value)?;
    }
    Some(result - 1)
}

/// A single cell, zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn parse(text: &str) -> Result<Self> {
        let caps = cell_regex()
            .captures(text.trim())
            .ok_or_else(|| Error::CellRef(text.to_string()))?;
        let (Some(col), Some(row)) = (caps.get(1), caps.get(2)) else {
            return Err(Error::CellRef(text.to_string()));
        };
        let col = column_letter_to_index(col.as_str()).ok_or_else(|| Error::CellRef(text.to_string()))?;
        let row: u32 = row
            .as_str()
            .parse()
            .map_err(|_| Error::CellRef(text.to_string()))?;
        if row == 0 {
            return Err(Error::CellRef(text.to_string()));
        }
        Ok(CellAddress { row: row - 1, col })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_index_to_letter(self.col), self.row + 1)
    }
}

/// A rectangular range; zero-based, end-exclusive, unbounded sides are `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_row: Option<u32>,
    pub end_row: Option<u32>,
    pub start_col: Option<u32>,
    pub end_col: Option<u32>,
}

/// One side of a range: `C4`, `C` or `4`
fn parse_corner(text: &str) -> Result<(Option<u32>, Option<u32>)> {
    let caps = cell_regex()
        .captures(text.trim())
        .ok_or_else(|| Error::CellRef(text.to_string()))?;
    let col = match caps.get(1) {
        Some(m) => Some(column_letter_to_index(m.as_str()).ok_or_else(|| Error::CellRef(text.to_string()))?),
        None => None,
    };
    let row = match caps.get(2) {
        Some(m) => {
            let row: u32 = m.as_str().parse().map_err(|_| Error::CellRef(text.to_string()))?;
            if row == 0 {
                return Err(Error::CellRef(text.to_string()));
            }
            Some(row - 1)
        }
        None => None,
    };
    if row.is_none() && col.is_none() {
        return Err(Error::CellRef(text.to_string()));
    }
    Ok((row, col))
}

impl CellRange {
    /// Parse `C4:C39`, `A5`, `1:6` or `A:C`
    pub fn parse(text: &str) -> Result<Self> {
        let (start, end) = match text.split_once(':') {
            Some((s, e)) => (s, e),
            None => (text, text),
        };
        let (start_row, start_col) = parse_corner(start)?;
        let (end_row, end_col) = parse_corner(end)?;

        // Both corners must agree on which dimensions are bounded
        if start_row.is_some() != end_row.is_some() || start_col.is_some() != end_col.is_some() {
            return Err(Error::CellRef(text.to_string()));
        }

        let order = |a: Option<u32>, b: Option<u32>| match (a, b) {
            (Some(a), Some(b)) => (Some(a.min(b)), Some(a.max(b) + 1)),
            _ => (None, None),
        };
        let (start_row, end_row) = order(start_row, end_row);
        let (start_col, end_col) = order(start_col, end_col);

        Ok(CellRange {
            start_row,
            end_row,
            start_col,
            end_col,
        })
    }

    pub fn to_grid_range(&self, sheet_id: i64) -> GridRange {
        GridRange {
            sheet_id,
            start_row_index: self.start_row,
            end_row_index: self.end_row,
            start_column_index: self.start_col,
            end_column_index: self.end_col,
        }
    }

    #[cfg(test)]
    pub(crate) fn top_left(&self) -> CellAddress {
        CellAddress {
            row: self.start_row.unwrap_or(0),
            col: self.start_col.unwrap_or(0),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corner = |row: Option<u32>, col: Option<u32>| {
            let mut s = String::new();
            if let Some(c) = col {
                s.push_str(&column_index_to_letter(c));
            }
            if let Some(r) = row {
                s.push_str(&(r + 1).to_string());
            }
            s
        };
        write!(
            f,
            "{}:{}",
            corner(self.start_row, self.start_col),
            corner(self.end_row.map(|r| r - 1), self.end_col.map(|c| c - 1))
        )
    }
}

/// Quote a sheet name for use in A1 notation, doubling embedded apostrophes
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// `'Sheet name'!A1:B2`
pub fn sheet_range(sheet: &str, range: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet), range)
}

/// Split `'Sheet'!A1:B2` into its sheet name (unquoted) and range part
#[cfg(test)]
pub(crate) fn split_sheet_range(text: &str) -> (Option<String>, &str) {
    match text.rfind('!') {
        Some(pos) => {
            let sheet = &text[..pos];
            let range = &text[pos + 1..];
            let sheet = if sheet.len() >= 2 && sheet.starts_with('\'') && sheet.ends_with('\'') {
                sheet[1..sheet.len() - 1].replace("''", "'")
            } else {
                sheet.to_string()
            };
            (Some(sheet), range)
        }
        None => (None, text),
    }
}
