//! Spreadsheet importer - .xlsx / .xls / .ods → raw table

use crate::error::{RatioError, RatioResult};
use crate::types::{Cell, RawTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the first worksheet of a workbook into a [`RawTable`]
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    /// Create a new importer for the given workbook
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the first worksheet, every cell kept as-is
    pub fn import(&self) -> RatioResult<RawTable> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            RatioError::Import(format!(
                "Failed to open workbook {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                RatioError::Import(format!("Workbook {} has no worksheets", self.path.display()))
            })?
            .map_err(|e| RatioError::Import(format!("Failed to read first worksheet: {}", e)))?;
        if range.is_empty() {
            return Err(RatioError::Import(format!(
                "First worksheet of {} is empty",
                self.path.display()
            )));
        }

        let table = range_to_table(&range);
        debug!(
            path = %self.path.display(),
            rows = table.len(),
            width = table.width(),
            "imported worksheet"
        );
        Ok(table)
    }
}

/// Convert a calamine range to a raw table
pub fn range_to_table(range: &Range<Data>) -> RawTable {
    RawTable::new(
        range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect(),
    )
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates, durations and error cells are not amounts
        other => Cell::Text(other.to_string()),
    }
}
