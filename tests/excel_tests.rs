//! Spreadsheet import/export tests
//!
//! Workbooks are generated with rust_xlsxwriter in a temp dir, read back
//! through calamine and run through the calculator.

use calamine::{open_workbook, Data, Reader, Xlsx};
use pretty_assertions::assert_eq;
use ratio_forge::core::analyze;
use ratio_forge::error::RatioError;
use ratio_forge::excel::{ExcelExporter, ExcelImporter};
use ratio_forge::types::{AnalysisOptions, Cell, HeaderMode, TotalAssetsPolicy};
use ratio_forge::writer::{render_markdown, TABLE_HEADERS};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_workbook(path: &Path, header: bool, rows: &[(&str, f64, f64)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let offset = if header {
        sheet.write_string(0, 0, "Chỉ tiêu").unwrap();
        sheet.write_string(0, 1, "Đầu năm").unwrap();
        sheet.write_string(0, 2, "Cuối năm").unwrap();
        1
    } else {
        0
    };
    for (i, (label, prior, current)) in rows.iter().enumerate() {
        let r = i as u32 + offset;
        sheet.write_string(r, 0, *label).unwrap();
        sheet.write_number(r, 1, *prior).unwrap();
        sheet.write_number(r, 2, *current).unwrap();
    }
    workbook.save(path).unwrap();
}

fn statement(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("statement.xlsx");
    write_workbook(
        &path,
        true,
        &[
            ("TỔNG CỘNG TÀI SẢN", 1_000_000.0, 1_500_000.0),
            ("A. TÀI SẢN NGẮN HẠN", 400_000.0, 900_000.0),
            ("I. Nợ ngắn hạn", 200_000.0, 300_000.0),
        ],
    );
    path
}

fn options(policy: TotalAssetsPolicy) -> AnalysisOptions {
    AnalysisOptions {
        policy,
        header: HeaderMode::Auto,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_import_keeps_header_and_native_numbers() {
    let dir = TempDir::new().unwrap();
    let raw = ExcelImporter::new(statement(&dir)).import().unwrap();

    assert_eq!(raw.len(), 4);
    assert_eq!(raw.width(), 3);
    assert_eq!(raw.rows[0][0], Cell::Text("Chỉ tiêu".to_string()));
    assert_eq!(raw.rows[1][1], Cell::Number(1_000_000.0));
}

#[test]
fn test_import_then_analyze() {
    let dir = TempDir::new().unwrap();
    let raw = ExcelImporter::new(statement(&dir)).import().unwrap();
    let analysis = analyze(&raw, options(TotalAssetsPolicy::Strict)).unwrap();

    assert_eq!(analysis.table.len(), 3);
    assert_eq!(analysis.table.rows[0].growth_pct, Some(50.0));
    assert_eq!(analysis.table.rows[1].prior_share_pct, Some(40.0));
    assert_eq!(analysis.liquidity.delta(), Some(1.0));
}

#[test]
fn test_import_without_header_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bare.xlsx");
    write_workbook(&path, false, &[("Cash", 10.0, 20.0), ("Inventory", 30.0, 60.0)]);

    let raw = ExcelImporter::new(&path).import().unwrap();
    let analysis = analyze(&raw, options(TotalAssetsPolicy::Lenient)).unwrap();
    assert_eq!(analysis.table.len(), 2);
    assert!(analysis.used_fallback());
}

#[test]
fn test_import_missing_file() {
    let err = ExcelImporter::new("does/not/exist.xlsx").import().unwrap_err();
    assert!(matches!(err, RatioError::Import(_)));
}

#[test]
fn test_import_rejects_non_spreadsheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "not a workbook").unwrap();

    let err = ExcelImporter::new(&path).import().unwrap_err();
    assert!(matches!(err, RatioError::Import(_)));
}

#[test]
fn test_two_column_sheet_is_structural_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("narrow.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "TOTAL ASSETS").unwrap();
    sheet.write_number(0, 1, 100.0).unwrap();
    workbook.save(&path).unwrap();

    let raw = ExcelImporter::new(&path).import().unwrap();
    let err = analyze(&raw, options(TotalAssetsPolicy::Lenient)).unwrap_err();
    assert!(err.is_structural());
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_writes_both_sheets() {
    let dir = TempDir::new().unwrap();
    let raw = ExcelImporter::new(statement(&dir)).import().unwrap();
    let analysis = analyze(&raw, options(TotalAssetsPolicy::Strict)).unwrap();

    let output = dir.path().join("analysis.xlsx");
    ExcelExporter::new(&analysis).export(&output).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Analysis".to_string(), "Ratios".to_string()]
    );

    let table = workbook.worksheet_range("Analysis").unwrap();
    let headers: Vec<String> = (0..TABLE_HEADERS.len())
        .map(|c| table.get_value((0, c as u32)).unwrap().to_string())
        .collect();
    assert_eq!(headers, TABLE_HEADERS.map(String::from).to_vec());
    assert_eq!(table.get_value((1, 3)), Some(&Data::Float(50.0)));

    let ratios = workbook.worksheet_range("Ratios").unwrap();
    assert_eq!(ratios.get_value((1, 1)), Some(&Data::Float(2.0)));
    assert_eq!(ratios.get_value((2, 1)), Some(&Data::Float(3.0)));
}

#[test]
fn test_exported_workbook_reanalyzes_identically() {
    let dir = TempDir::new().unwrap();
    let raw = ExcelImporter::new(statement(&dir)).import().unwrap();
    let first = analyze(&raw, options(TotalAssetsPolicy::Strict)).unwrap();

    let output = dir.path().join("analysis.xlsx");
    ExcelExporter::new(&first).export(&output).unwrap();

    let reimported = ExcelImporter::new(&output).import().unwrap();
    let second = analyze(&reimported, options(TotalAssetsPolicy::Strict)).unwrap();
    assert_eq!(render_markdown(&first.table), render_markdown(&second.table));
}

#[test]
fn test_export_lists_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.xlsx");
    write_workbook(&path, true, &[("Cash", 10.0, 20.0)]);

    let raw = ExcelImporter::new(&path).import().unwrap();
    let analysis = analyze(&raw, options(TotalAssetsPolicy::Lenient)).unwrap();
    let output = dir.path().join("analysis.xlsx");
    ExcelExporter::new(&analysis).export(&output).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    let ratios = workbook.worksheet_range("Ratios").unwrap();
    assert_eq!(
        ratios.get_value((1, 1)),
        Some(&Data::String("N/A".to_string()))
    );
    let notes: Vec<String> = ratios
        .rows()
        .skip(4)
        .filter_map(|row| row.first().map(|c| c.to_string()))
        .collect();
    assert_eq!(notes.len(), analysis.warnings.len());
    assert!(notes.iter().any(|n| n.contains("approximation")));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let raw = ExcelImporter::new(statement(&dir)).import().unwrap();
    let analysis = analyze(&raw, options(TotalAssetsPolicy::Lenient)).unwrap();

    let output = dir.path().join("missing").join("analysis.xlsx");
    let err = ExcelExporter::new(&analysis).export(&output).unwrap_err();
    assert!(matches!(err, RatioError::Export(_)));
}

#[test]
fn test_import_empty_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    workbook.save(&path).unwrap();

    let err = ExcelImporter::new(&path).import().unwrap_err();
    assert!(matches!(err, RatioError::Import(_)));
}
