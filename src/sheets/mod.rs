pub mod json;

pub use json::{JsonWorkbook, JsonWorkbookStore};

use crate::error::{InventoryError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(u64),
    DateTime(DateTime<Utc>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::DateTime(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::DateTime(value)
    }
}

/// An opened spreadsheet. Sheets are addressed by position, rows and
/// columns are 1-based.
pub trait Spreadsheet {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn url(&self) -> String;
    fn sheet_names(&self) -> Vec<String>;

    /// Remove every value of `sheet`, keeping the sheet itself.
    fn clear_contents(&mut self, sheet: usize) -> Result<()>;

    /// Write a rectangular block whose top-left cell is (`row`, `column`).
    fn set_values(
        &mut self,
        sheet: usize,
        row: usize,
        column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<()>;

    fn values(&self, sheet: usize) -> Result<Vec<Vec<CellValue>>>;
}

pub trait SpreadsheetService {
    type Book: Spreadsheet;

    fn open_by_id(&self, id: &str) -> Result<Self::Book>;
}

/// One sheet of a borrowed spreadsheet.
pub struct Sheet<'a, B: Spreadsheet> {
    book: &'a mut B,
    index: usize,
    name: String,
}

impl<'a, B: Spreadsheet> Sheet<'a, B> {
    /// The sheet at position 0, whatever its name.
    pub fn first(book: &'a mut B) -> Result<Self> {
        Self::at(book, 0)
    }

    pub fn at(book: &'a mut B, index: usize) -> Result<Self> {
        let name = book
            .sheet_names()
            .into_iter()
            .nth(index)
            .ok_or_else(|| InventoryError::NoSheets {
                id: book.id().to_string(),
            })?;

        Ok(Self { book, index, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clear_contents(&mut self) -> Result<()> {
        self.book.clear_contents(self.index)
    }

    pub fn set_values(&mut self, row: usize, column: usize, values: &[Vec<CellValue>]) -> Result<()> {
        self.book.set_values(self.index, row, column, values)
    }

    pub fn values(&self) -> Result<Vec<Vec<CellValue>>> {
        self.book.values(self.index)
    }
}

/// Reject blocks that are empty, ragged or anchored outside the sheet.
pub(crate) fn check_block(row: usize, column: usize, values: &[Vec<CellValue>]) -> Result<usize> {
    if row == 0 || column == 0 {
        return Err(InventoryError::InvalidRange {
            message: format!("rows and columns start at 1, got ({}, {})", row, column),
        });
    }

    let width = values.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(InventoryError::InvalidRange {
            message: "block has no cells".to_string(),
        });
    }

    if values.iter().any(|r| r.len() != width) {
        return Err(InventoryError::InvalidRange {
            message: "block rows differ in length".to_string(),
        });
    }

    Ok(width)
}
