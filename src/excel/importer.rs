//! Excel importer implementation - workbook → sheets

use crate::core::header::DEFAULT_MAX_SCAN;
use crate::core::{
    build_columns, drop_duplicate_header, locate_header_row, normalize_column, DateColumnOutcome,
};
use crate::error::{FixerError, FixerResult};
use crate::types::{CellValue, Progress, Sheet};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A loaded sheet plus what the loader decided about it
#[derive(Debug, Clone)]
pub struct ImportedSheet {
    pub sheet: Sheet,
    /// Row of the raw sheet (blank rows skipped) used as header
    pub header_row: usize,
    pub duplicate_header_dropped: bool,
    /// Normalizer verdict for every column, in column order
    pub outcomes: Vec<DateColumnOutcome>,
}

/// Excel importer. Format (.xlsx, .xls, .xlsb, .ods) is detected from the file.
pub struct ExcelImporter {
    path: PathBuf,
    max_scan: usize,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_scan: DEFAULT_MAX_SCAN,
        }
    }

    /// Rows searched for the header (default 30)
    #[must_use]
    pub fn with_max_scan(mut self, rows: usize) -> Self {
        self.max_scan = rows;
        self
    }

    /// Import every sheet, in workbook order
    pub fn import(&self) -> FixerResult<Vec<ImportedSheet>> {
        self.import_with_progress(|_| {})
    }

    /// Import every sheet, reporting progress after each one
    pub fn import_with_progress<F>(&self, mut progress: F) -> FixerResult<Vec<ImportedSheet>>
    where
        F: FnMut(&Progress),
    {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.open_error(e))?;
        let sheet_names = workbook.sheet_names().to_vec();
        let total = sheet_names.len();
        let file_name = self.file_name();

        let mut sheets = Vec::with_capacity(total);
        for (idx, sheet_name) in sheet_names.iter().enumerate() {
            progress(&Progress::new(
                format!("Loading {} → {}", file_name, sheet_name),
                idx + 1,
                total,
            ));

            let range = workbook
                .worksheet_range(sheet_name)
                .map_err(|e| self.open_error(e))?;
            sheets.push(self.process_sheet(sheet_name, &range));
        }

        info!(file = %file_name, sheets = sheets.len(), "workbook loaded");
        Ok(sheets)
    }

    /// Header detection, table build, and date normalization for one sheet
    fn process_sheet(&self, sheet_name: &str, range: &Range<Data>) -> ImportedSheet {
        let rows = raw_rows(range);
        let header_row = locate_header_row(&rows, self.max_scan);

        let mut columns = build_columns(&rows, header_row);
        let duplicate_header_dropped = drop_duplicate_header(&mut columns);

        let outcomes: Vec<DateColumnOutcome> = columns.iter_mut().map(normalize_column).collect();

        let mut sheet = Sheet::new(sheet_name);
        for column in columns {
            sheet.add_column(column);
        }

        debug!(
            sheet = %sheet_name,
            header_row,
            rows = sheet.row_count(),
            date_columns = ?sheet.date_columns(),
            "sheet processed"
        );

        ImportedSheet {
            sheet,
            header_row,
            duplicate_header_dropped,
            outcomes,
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn open_error<E: std::fmt::Display>(&self, err: E) -> FixerError {
        FixerError::Open {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

/// Range → rows of cells, skipping rows with no content at all
fn raw_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect()
}

/// Convert a calamine cell into a [`CellValue`]
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match serial_to_date(dt) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Excel serial → calendar date, honoring the workbook's 1900/1904 epoch and
/// the phantom 1900-02-29. Durations and pure times of day are not dates.
fn serial_to_date(dt: &ExcelDateTime) -> Option<NaiveDate> {
    let serial = dt.as_f64();
    if dt.is_duration() || !serial.is_finite() || (serial > 0.0 && serial < 1.0) {
        return None;
    }
    dt.as_datetime().map(|d| d.date())
}
