//! Excel exporter implementation

use crate::error::{FixerError, FixerResult};
use crate::types::{CellValue, Progress, Sheet, DATE_DISPLAY_FORMAT};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Excel number format applied to date columns
pub const DATE_NUMBER_FORMAT: &str = "dd-mm-yyyy";

/// Number format for stray date cells outside date columns
const PLAIN_DATE_NUMBER_FORMAT: &str = "yyyy-mm-dd";

/// Excel exporter for loaded sheets
pub struct ExcelExporter<'a> {
    sheets: &'a [Sheet],
    date_format: Format,
    plain_date_format: Format,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(sheets: &'a [Sheet]) -> Self {
        Self {
            sheets,
            date_format: Format::new().set_num_format(DATE_NUMBER_FORMAT),
            plain_date_format: Format::new().set_num_format(PLAIN_DATE_NUMBER_FORMAT),
        }
    }

    /// Export all sheets to an .xlsx file
    pub fn export(&self, output_path: &Path) -> FixerResult<()> {
        self.export_with_progress(output_path, |_| {})
    }

    /// Export all sheets, reporting progress after each one.
    ///
    /// The workbook is written to a sibling temp file and renamed into place,
    /// so a failed export never leaves a half-written file at `output_path`.
    pub fn export_with_progress<F>(&self, output_path: &Path, mut progress: F) -> FixerResult<()>
    where
        F: FnMut(&Progress),
    {
        let mut workbook = Workbook::new();
        let total = self.sheets.len();
        let file_name = output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for (idx, sheet) in self.sheets.iter().enumerate() {
            progress(&Progress::new(
                format!("Exporting {} → {}", file_name, sheet.name),
                idx + 1,
                total,
            ));
            self.export_sheet(&mut workbook, sheet)?;
        }

        let buffer = workbook.save_to_buffer()?;
        let partial = partial_path(output_path);
        if let Err(e) = fs::write(&partial, &buffer).and_then(|_| fs::rename(&partial, output_path)) {
            if partial.exists() {
                if let Err(cleanup) = fs::remove_file(&partial) {
                    warn!(path = %partial.display(), "failed to remove partial export: {}", cleanup);
                }
            }
            return Err(FixerError::Export(format!(
                "Failed to save {}: {}",
                output_path.display(),
                e
            )));
        }

        info!(path = %output_path.display(), sheets = total, "workbook exported");
        Ok(())
    }

    /// Export a single sheet to a worksheet
    fn export_sheet(&self, workbook: &mut Workbook, sheet: &Sheet) -> FixerResult<()> {
        sheet.validate_lengths().map_err(FixerError::Validation)?;
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| FixerError::Export(format!("Failed to set worksheet name '{}': {}", sheet.name, e)))?;

        for (col_idx, column) in sheet.columns.iter().enumerate() {
            let col = col_idx as u16;
            worksheet
                .write_string(0, col, &column.name)
                .map_err(|e| FixerError::Export(format!("Failed to write header: {}", e)))?;

            for (row_idx, value) in column.values.iter().enumerate() {
                let row = (row_idx + 1) as u32; // +1 for header row
                self.write_cell_value(worksheet, row, col, value, column.is_date)?;
            }
        }

        worksheet.autofit();
        Ok(())
    }

    /// Write a single cell value based on its variant
    fn write_cell_value(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        value: &CellValue,
        date_column: bool,
    ) -> FixerResult<()> {
        match value {
            CellValue::Empty => {}
            CellValue::Text(s) if s.is_empty() => {}
            CellValue::Text(s) => {
                worksheet
                    .write_string(row, col, s)
                    .map_err(|e| FixerError::Export(format!("Failed to write text: {}", e)))?;
            }
            CellValue::Number(n) => {
                worksheet
                    .write_number(row, col, *n)
                    .map_err(|e| FixerError::Export(format!("Failed to write number: {}", e)))?;
            }
            CellValue::Bool(b) => {
                worksheet
                    .write_boolean(row, col, *b)
                    .map_err(|e| FixerError::Export(format!("Failed to write boolean: {}", e)))?;
            }
            CellValue::Date(date) => {
                let (format, text_format) = if date_column {
                    (&self.date_format, DATE_DISPLAY_FORMAT)
                } else {
                    (&self.plain_date_format, "%Y-%m-%d")
                };
                match excel_date(*date) {
                    Some(datetime) => {
                        worksheet
                            .write_datetime_with_format(row, col, &datetime, format)
                            .map_err(|e| FixerError::Export(format!("Failed to write date: {}", e)))?;
                    }
                    // Before 1899-12-31 Excel has no serial; keep the date as text
                    None => {
                        worksheet
                            .write_string(row, col, date.format(text_format).to_string())
                            .map_err(|e| FixerError::Export(format!("Failed to write date: {}", e)))?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Date as an Excel serial, or `None` when Excel cannot store it
fn excel_date(date: NaiveDate) -> Option<ExcelDateTime> {
    let year = u16::try_from(date.year()).ok()?;
    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8).ok()
}

/// `report.xlsx` → `.report.xlsx.partial` in the same directory
fn partial_path(output_path: &Path) -> PathBuf {
    let name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export.xlsx".to_string());
    output_path.with_file_name(format!(".{}.partial", name))
}
