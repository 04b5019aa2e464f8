//! End-to-end tests for the `ratio-forge` binary

#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn ratio_forge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ratio-forge").unwrap();
    cmd.current_dir(dir).env_remove("GEMINI_API_KEY");
    cmd
}

fn write_statement(dir: &TempDir, name: &str, rows: &[(&str, f64, f64)]) -> PathBuf {
    let path = dir.path().join(name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Line item").unwrap();
    sheet.write_string(0, 1, "2023").unwrap();
    sheet.write_string(0, 2, "2024").unwrap();
    for (i, (label, prior, current)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, *label).unwrap();
        sheet.write_number(r, 1, *prior).unwrap();
        sheet.write_number(r, 2, *current).unwrap();
    }
    workbook.save(&path).unwrap();
    path
}

fn sample(dir: &TempDir) -> PathBuf {
    write_statement(
        dir,
        "statement.xlsx",
        &[
            ("TOTAL ASSETS", 100.0, 150.0),
            ("SHORT-TERM ASSETS", 40.0, 90.0),
            ("SHORT-TERM LIABILITIES", 20.0, 30.0),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP / VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    ratio_forge(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("commentary"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    ratio_forge(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ═══════════════════════════════════════════════════════════════════════════
// ANALYZE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_analyze_table_output() {
    let dir = TempDir::new().unwrap();
    let file = sample(&dir);
    ratio_forge(dir.path())
        .arg("analyze")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("TOTAL ASSETS"))
        .stdout(predicate::str::contains("Current Ratio"))
        .stdout(predicate::str::contains("3.00"));
}

#[test]
fn test_analyze_markdown_output() {
    let dir = TempDir::new().unwrap();
    let file = sample(&dir);
    ratio_forge(dir.path())
        .args(["analyze", "--format", "markdown"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "| TOTAL ASSETS | 100.00 | 150.00 | 50.00 | 100.00 | 100.00 |",
        ))
        .stdout(predicate::str::contains("| Current ratio (prior period) | 2.00 |"));
}

#[test]
fn test_analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let file = sample(&dir);
    let output = ratio_forge(dir.path())
        .args(["analyze", "-f", "json"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["policy"], "lenient");
    assert_eq!(json["liquidity"]["current"], 3.0);
}

#[test]
fn test_analyze_strict_without_total_assets_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(&dir, "partial.xlsx", &[("Cash", 10.0, 20.0)]);
    ratio_forge(dir.path())
        .args(["analyze", "--strict"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOTAL ASSETS"));
}

#[test]
fn test_analyze_lenient_without_total_assets_warns() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(&dir, "partial.xlsx", &[("Cash", 10.0, 20.0)]);
    ratio_forge(dir.path())
        .args(["analyze", "--lenient"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("approximation"));
}

#[test]
fn test_policy_from_config_file() {
    let dir = TempDir::new().unwrap();
    let file = write_statement(&dir, "partial.xlsx", &[("Cash", 10.0, 20.0)]);
    std::fs::write(
        dir.path().join("ratio-forge.yaml"),
        "profile:\n  total_assets_policy: strict\n",
    )
    .unwrap();

    ratio_forge(dir.path())
        .arg("analyze")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOTAL ASSETS"));
}

#[test]
fn test_analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    ratio_forge(dir.path())
        .args(["analyze", "nope.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import error"));
}

#[test]
fn test_strict_and_lenient_conflict() {
    let dir = TempDir::new().unwrap();
    let file = sample(&dir);
    ratio_forge(dir.path())
        .args(["analyze", "--strict", "--lenient"])
        .arg(&file)
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT / COMMENTARY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_creates_workbook() {
    let dir = TempDir::new().unwrap();
    let file = sample(&dir);
    let output = dir.path().join("analysis.xlsx");
    ratio_forge(dir.path())
        .arg("export")
        .arg(&file)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));
    assert!(output.exists());
}

#[test]
fn test_commentary_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let file = sample(&dir);
    ratio_forge(dir.path())
        .arg("commentary")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
