//! Session workflow tests: load several files, edit, flag, export, reload

use datefix::config::FixerConfig;
use datefix::{CellValue, Session, Workbook};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_trades(dir: &Path, name: &str, rows: &[(&str, &str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = XlsxWorkbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Trades").unwrap();
    sheet.write_string(0, 0, "Capital Gains Report").unwrap();
    for (col, header) in ["Stock Name", "Sell Date", "Asset Type"].iter().enumerate() {
        sheet.write_string(1, col as u16, *header).unwrap();
    }
    for (i, (stock, sold, asset)) in rows.iter().enumerate() {
        let r = (i + 2) as u32;
        sheet.write_string(r, 0, *stock).unwrap();
        sheet.write_string(r, 1, *sold).unwrap();
        sheet.write_string(r, 2, *asset).unwrap();
    }
    workbook.save(&path).unwrap();
    path
}

fn load(path: &Path) -> Workbook {
    Workbook::load(path, &FixerConfig::default(), |_| {}).unwrap()
}

#[test]
fn test_load_files_keeps_going_past_failures() {
    let temp_dir = TempDir::new().unwrap();
    let first = write_trades(
        temp_dir.path(),
        "fy22.xlsx",
        &[("INFY", "20220310", "Long Term")],
    );
    let broken = temp_dir.path().join("broken.xlsx");
    fs::write(&broken, "garbage").unwrap();
    let second = write_trades(
        temp_dir.path(),
        "fy23.xlsx",
        &[("TCS", "01-02-2023", "Short Term")],
    );

    let mut session = Session::new(FixerConfig::default());
    let report = session.load_files([&first, &broken, &second], |_| {});

    assert_eq!(report.loaded, vec![first, second]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, broken);

    let names: Vec<&str> = session
        .workbooks()
        .iter()
        .map(|w| w.file_name.as_str())
        .collect();
    assert_eq!(names, vec!["fy22.xlsx", "fy23.xlsx"]);
}

#[test]
fn test_load_records_header_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_trades(temp_dir.path(), "fy22.xlsx", &[("INFY", "20220310", "Long Term")]);

    let workbook = load(&path);
    assert_eq!(workbook.sheet_names(), vec!["Trades"]);
    assert_eq!(workbook.header_rows, vec![1]);
    assert_eq!(workbook.view().unwrap().rows[0], vec!["INFY", "10-03-2022", "Long Term"]);
}

#[test]
fn test_search_across_columns() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_trades(
        temp_dir.path(),
        "fy22.xlsx",
        &[
            ("INFY", "20220310", "Long Term"),
            ("TCS", "15-06-2022", "Short Term"),
            ("HDFC", "3/4/22", "Long Term"),
        ],
    );
    let workbook = load(&path);

    let short = workbook.search("SHORT").unwrap();
    assert_eq!(short.rows.len(), 1);
    assert_eq!(short.rows[0][0], "TCS");

    // Search runs on the displayed text, so formatted dates match
    let by_date = workbook.search("03-04-2022").unwrap();
    assert_eq!(by_date.rows.len(), 1);
    assert_eq!(by_date.rows[0][0], "HDFC");

    assert!(workbook.search("nothing like this").unwrap().rows.is_empty());
}

#[test]
fn test_edit_flag_export_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_trades(
        temp_dir.path(),
        "fy22.xlsx",
        &[("INFY", "20220310", "Long Term"), ("TCS", "15-06-2022", "Short Term")],
    );
    let mut session = Session::default();
    session.load_files([&path], |_| {});

    let workbook = session.workbook_mut(0).unwrap();
    workbook.edit_cell(1, "Sell Date", "31/12/2022").unwrap();
    workbook.edit_cell(0, "Stock Name", "Infosys").unwrap();
    assert!(workbook.add_flags().unwrap());

    let output = temp_dir.path().join("out.xlsx");
    workbook.export(&output, |_| {}).unwrap();

    let reloaded = load(&output);
    let sheet = reloaded.active_sheet().unwrap();
    assert_eq!(
        sheet.column_names(),
        vec!["Stock Name", "Sell Date", "Asset Type", "Flag"]
    );
    assert_eq!(sheet.date_columns(), vec!["Sell Date"]);
    assert_eq!(
        reloaded.view().unwrap().rows,
        vec![
            vec!["Infosys", "10-03-2022", "Long Term", "yes"],
            vec!["TCS", "31-12-2022", "Short Term", "no"],
        ]
    );
}

#[test]
fn test_export_is_stable_across_reloads() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_trades(
        temp_dir.path(),
        "fy22.xlsx",
        &[("INFY", "20220310", "Long Term"), ("TCS", "unknown", "Short Term")],
    );

    let first = load(&path);
    let once = temp_dir.path().join("once.xlsx");
    first.export(&once, |_| {}).unwrap();

    let second = load(&once);
    let twice = temp_dir.path().join("twice.xlsx");
    second.export(&twice, |_| {}).unwrap();

    let third = load(&twice);
    assert_eq!(second.view().unwrap(), third.view().unwrap());
    assert_eq!(first.view().unwrap(), second.view().unwrap());

    let sell = third.active_sheet().unwrap().column("Sell Date").unwrap();
    assert_eq!(sell.values[1], CellValue::text("unknown"));
}

#[test]
fn test_paste_then_copy_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_trades(
        temp_dir.path(),
        "fy22.xlsx",
        &[("INFY", "20220310", "Long Term"), ("TCS", "15-06-2022", "Short Term")],
    );
    let mut workbook = load(&path);

    let copied = workbook.copy_rows(&[0]).unwrap();
    assert_eq!(copied, "INFY\t10-03-2022\tLong Term");

    assert_eq!(workbook.paste_rows(1, &copied).unwrap(), 1);
    assert_eq!(workbook.copy_rows(&[0, 1]).unwrap(), format!("{}\n{}", copied, copied));
}
