//! CLI Integration Tests
//!
//! Runs the `datefix` binary with assert_cmd against workbooks written into a
//! temp dir.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn datefix() -> Command {
    Command::cargo_bin("datefix").unwrap()
}

/// Two-sheet statement: "Holdings" has a title row above its header
fn write_statement(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();

    let holdings = workbook.add_worksheet();
    holdings.set_name("Holdings").unwrap();
    holdings.write_string(0, 0, "Statement of Holdings").unwrap();
    for (col, header) in ["Stock Name", "Buy Date", "Asset Type", "Quantity"]
        .iter()
        .enumerate()
    {
        holdings.write_string(1, col as u16, *header).unwrap();
    }
    let rows = [
        ("INFY", "20230115", "Long Term", 10.0),
        ("TCS", "15012023", "Short Term", 5.0),
    ];
    for (i, (stock, date, asset, qty)) in rows.iter().enumerate() {
        let r = (i + 2) as u32;
        holdings.write_string(r, 0, *stock).unwrap();
        holdings.write_string(r, 1, *date).unwrap();
        holdings.write_string(r, 2, *asset).unwrap();
        holdings.write_number(r, 3, *qty).unwrap();
    }

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Remark").unwrap();
    notes.write_string(1, 0, "dividends pending").unwrap();

    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    datefix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("datefix"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    datefix()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("datefix"));
}

#[test]
fn test_fix_help() {
    datefix()
        .args(["fix", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--suffix"));
}

#[test]
fn test_fix_requires_files() {
    datefix().arg("fix").assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// FIX TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_fix_writes_fixed_copy() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");

    datefix()
        .arg("fix")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("ais.xlsx"))
        .stdout(predicate::str::contains("Exported 1 of 1"));

    assert!(temp_dir.path().join("ais_fixed.xlsx").exists());
    assert!(!temp_dir.path().join(".ais_fixed.xlsx.partial").exists());
}

#[test]
fn test_fix_output_dir_and_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let out_dir = temp_dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    datefix()
        .arg("fix")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .args(["--suffix", "_clean"])
        .assert()
        .success();

    assert!(out_dir.join("ais_clean.xlsx").exists());
}

#[test]
fn test_fix_skips_unreadable_file() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_statement(temp_dir.path(), "good.xlsx");
    let bad = temp_dir.path().join("bad.xlsx");
    fs::write(&bad, "not a workbook").unwrap();

    datefix()
        .arg("fix")
        .arg(&bad)
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("Load error"))
        .stdout(predicate::str::contains("Exported 1 of 2"));

    assert!(temp_dir.path().join("good_fixed.xlsx").exists());
}

#[test]
fn test_fix_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    datefix()
        .arg("fix")
        .arg(temp_dir.path().join("missing.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files exported"));
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT / SHOW TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_inspect_lists_sheets_and_date_columns() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");

    datefix()
        .arg("inspect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Holdings"))
        .stdout(predicate::str::contains("Notes"))
        .stdout(predicate::str::contains("header row 1"))
        .stdout(predicate::str::contains("(date, 2/2 parsed)"));
}

#[test]
fn test_show_grid() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");

    datefix()
        .arg("show")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sheets: Holdings, Notes"))
        .stdout(predicate::str::contains("Stock Name"))
        .stdout(predicate::str::contains("15-01-2023"))
        .stdout(predicate::str::contains("2 row(s)"));
}

#[test]
fn test_show_search_and_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");

    datefix()
        .arg("show")
        .arg(&input)
        .args(["--search", "tcs", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sheet\": \"Holdings\""))
        .stdout(predicate::str::contains("TCS"))
        .stdout(predicate::str::contains("INFY").not());
}

#[test]
fn test_show_other_sheet() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");

    datefix()
        .arg("show")
        .arg(&input)
        .args(["--sheet", "Notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dividends pending"));
}

#[test]
fn test_show_unknown_sheet_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");

    datefix()
        .arg("show")
        .arg(&input)
        .args(["--sheet", "Missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EDITING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_flag_then_copy_column() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let output = temp_dir.path().join("flagged.xlsx");

    datefix()
        .arg("flag")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export successful"));

    datefix()
        .arg("copy-column")
        .arg(&output)
        .args(["--column", "Flag"])
        .assert()
        .success()
        .stdout("yes\nno\n");
}

#[test]
fn test_flag_without_asset_type_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let output = temp_dir.path().join("flagged.xlsx");

    datefix()
        .arg("flag")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--sheet", "Notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Asset Type"));

    assert!(!output.exists());
}

#[test]
fn test_single_edit() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let output = temp_dir.path().join("edited.xlsx");

    datefix()
        .arg("edit")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--row", "1", "--column", "Buy Date", "--value", "3/4/21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 1 edit(s)"));

    datefix()
        .arg("copy-column")
        .arg(&output)
        .args(["--column", "Buy Date"])
        .assert()
        .success()
        .stdout("15-01-2023\n03-04-2021\n");
}

#[test]
fn test_batch_edits_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let output = temp_dir.path().join("edited.xlsx");
    let edits = temp_dir.path().join("edits.yaml");
    fs::write(
        &edits,
        "edits:\n  - row: 0\n    column: Quantity\n    value: 12\n  - sheet: Notes\n    row: 0\n    column: Remark\n    value: paid\n",
    )
    .unwrap();

    datefix()
        .arg("edit")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--edits")
        .arg(&edits)
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2 edit(s)"));

    datefix()
        .arg("copy-column")
        .arg(&output)
        .args(["--column", "Remark", "--sheet", "Notes"])
        .assert()
        .success()
        .stdout("paid\n");
}

#[test]
fn test_edit_row_out_of_range() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let output = temp_dir.path().join("edited.xlsx");

    datefix()
        .arg("edit")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--row", "9", "--column", "Stock Name", "--value", "x"])
        .assert()
        .failure();

    assert!(!output.exists());
}

#[test]
fn test_paste_from_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_statement(temp_dir.path(), "ais.xlsx");
    let output = temp_dir.path().join("pasted.xlsx");

    datefix()
        .arg("paste")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--start-row", "0"])
        .write_stdin("HDFC\t01-01-2020\tLong Term\t3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pasted into 1 row(s)"));

    datefix()
        .arg("copy-column")
        .arg(&output)
        .args(["--column", "Stock Name"])
        .assert()
        .success()
        .stdout("HDFC\nTCS\n");
}
