//! Spreadsheet import/export
//!
//! - Import: workbook (.xlsx/.xls/.ods) → raw table for the calculator
//! - Export: analysis → .xlsx with formatted values

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::{range_to_table, ExcelImporter};
