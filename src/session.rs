//! Session state: the open workbooks and what the user does to them
//!
//! A [`Session`] owns every loaded [`Workbook`]; each workbook owns its sheets,
//! its active sheet, and the date-column tags carried on its columns. All
//! mutation happens through the methods here, one action at a time.

use crate::config::FixerConfig;
use crate::core::{dates, flags, search};
use crate::error::{FixerError, FixerResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::types::{CellValue, Progress, Sheet, SheetView};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One open file
#[derive(Debug, Clone)]
pub struct Workbook {
    pub path: PathBuf,
    pub file_name: String,
    pub sheets: Vec<Sheet>,
    /// Detected header row per sheet, parallel to `sheets`
    pub header_rows: Vec<usize>,
    active: Option<usize>,
}

impl Workbook {
    /// Load a workbook from disk. The first sheet becomes active.
    pub fn load<P, F>(path: P, config: &FixerConfig, progress: F) -> FixerResult<Self>
    where
        P: AsRef<Path>,
        F: FnMut(&Progress),
    {
        let path = path.as_ref();
        let imported = ExcelImporter::new(path)
            .with_max_scan(config.max_scan_rows)
            .import_with_progress(progress)?;

        let header_rows = imported.iter().map(|s| s.header_row).collect();
        let sheets = imported.into_iter().map(|s| s.sheet).collect();
        let mut workbook = Self::from_sheets(path, sheets);
        workbook.header_rows = header_rows;
        Ok(workbook)
    }

    /// Build a workbook from sheets already in memory
    pub fn from_sheets<P: AsRef<Path>>(path: P, sheets: Vec<Sheet>) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let active = if sheets.is_empty() { None } else { Some(0) };
        Self {
            path,
            file_name,
            header_rows: vec![0; sheets.len()],
            sheets,
            active,
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Make `name` the active sheet
    pub fn select_sheet(&mut self, name: &str) -> FixerResult<()> {
        let idx = self
            .sheets
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| FixerError::SheetNotFound(name.to_string()))?;
        self.active = Some(idx);
        Ok(())
    }

    pub fn active_sheet(&self) -> FixerResult<&Sheet> {
        self.active
            .and_then(|idx| self.sheets.get(idx))
            .ok_or(FixerError::NoActiveSheet)
    }

    fn active_sheet_mut(&mut self) -> FixerResult<&mut Sheet> {
        self.active
            .and_then(|idx| self.sheets.get_mut(idx))
            .ok_or(FixerError::NoActiveSheet)
    }

    /// Display grid of the active sheet
    pub fn view(&self) -> FixerResult<SheetView> {
        Ok(SheetView::from_sheet(self.active_sheet()?))
    }

    /// Rows of the active sheet containing `keyword` in any column
    pub fn search(&self, keyword: &str) -> FixerResult<SheetView> {
        let view = self.view()?;
        let matches = search::filter_rows(&view, keyword);
        Ok(view.select_rows(&matches))
    }

    /// Add the Long/Short term flag column to the active sheet
    pub fn add_flags(&mut self) -> FixerResult<bool> {
        flags::add_flags(self.active_sheet_mut()?)
    }

    /// Overwrite one cell of the active sheet with user text.
    ///
    /// In a date column the text is parsed with the normalizer's strategy
    /// chain and stored as a date when it parses.
    pub fn edit_cell(&mut self, row: usize, column: &str, text: &str) -> FixerResult<()> {
        let sheet = self.active_sheet_mut()?;
        let rows = sheet.row_count();
        let sheet_name = sheet.name.clone();
        let target = sheet
            .column_mut(column)
            .ok_or_else(|| FixerError::ColumnNotFound {
                sheet: sheet_name,
                column: column.to_string(),
            })?;
        let is_date = target.is_date;
        let cell = target
            .values
            .get_mut(row)
            .ok_or(FixerError::RowOutOfRange { row, rows })?;
        *cell = cell_from_input(text, is_date);
        Ok(())
    }

    /// Every value of one column, newline separated
    pub fn copy_column(&self, column: &str) -> FixerResult<String> {
        let sheet = self.active_sheet()?;
        let target = sheet
            .column(column)
            .ok_or_else(|| FixerError::ColumnNotFound {
                sheet: sheet.name.clone(),
                column: column.to_string(),
            })?;
        Ok(target
            .values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Selected rows as tab-separated lines
    pub fn copy_rows(&self, rows: &[usize]) -> FixerResult<String> {
        let sheet = self.active_sheet()?;
        let count = sheet.row_count();
        let mut lines = Vec::with_capacity(rows.len());
        for &row in rows {
            if row >= count {
                return Err(FixerError::RowOutOfRange { row, rows: count });
            }
            lines.push(sheet.row_display(row).join("\t"));
        }
        Ok(lines.join("\n"))
    }

    /// Paste tab-separated lines into consecutive rows from `start_row`.
    /// Short lines are padded with empty cells, extra values and lines past
    /// the last row are dropped. Returns the number of rows written.
    pub fn paste_rows(&mut self, start_row: usize, text: &str) -> FixerResult<usize> {
        let sheet = self.active_sheet()?;
        let rows = sheet.row_count();
        if start_row >= rows {
            return Err(FixerError::RowOutOfRange {
                row: start_row,
                rows,
            });
        }
        let columns = sheet.column_names();

        let mut written = 0;
        for (offset, line) in text.lines().enumerate() {
            let row = start_row + offset;
            if row >= rows {
                break;
            }
            let mut values = line.split('\t');
            for column in &columns {
                self.edit_cell(row, column, values.next().unwrap_or(""))?;
            }
            written += 1;
        }
        Ok(written)
    }

    /// Export every sheet to `path` with date columns formatted `DD-MM-YYYY`
    pub fn export<P, F>(&self, path: P, progress: F) -> FixerResult<()>
    where
        P: AsRef<Path>,
        F: FnMut(&Progress),
    {
        ExcelExporter::new(&self.sheets).export_with_progress(path.as_ref(), progress)
    }
}

/// Text typed or pasted by the user → cell
fn cell_from_input(text: &str, date_column: bool) -> CellValue {
    if text.trim().is_empty() {
        return CellValue::Empty;
    }
    let value = CellValue::text(text);
    if date_column {
        if let Some(date) = dates::parse_date_value(&value) {
            return CellValue::Date(date);
        }
    }
    value
}

//==============================================================================
// Session
//==============================================================================

/// A file that could not be loaded
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of loading several files
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<PathBuf>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// All open workbooks
#[derive(Debug, Default)]
pub struct Session {
    config: FixerConfig,
    workbooks: Vec<Workbook>,
}

impl Session {
    pub fn new(config: FixerConfig) -> Self {
        Self {
            config,
            workbooks: Vec::new(),
        }
    }

    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    /// Load each file independently. A file that fails is recorded in the
    /// report and skipped; the rest still load.
    pub fn load_files<I, P, F>(&mut self, paths: I, mut progress: F) -> LoadReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
        F: FnMut(&Progress),
    {
        let mut report = LoadReport::default();
        for path in paths {
            let path = path.as_ref();
            match Workbook::load(path, &self.config, &mut progress) {
                Ok(workbook) => {
                    info!(path = %path.display(), sheets = workbook.sheets.len(), "loaded");
                    self.workbooks.push(workbook);
                    report.loaded.push(path.to_path_buf());
                }
                Err(e) => {
                    warn!(path = %path.display(), "skipping file: {}", e);
                    report.failures.push(LoadFailure {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    pub fn workbooks(&self) -> &[Workbook] {
        &self.workbooks
    }

    pub fn workbook_mut(&mut self, index: usize) -> Option<&mut Workbook> {
        self.workbooks.get_mut(index)
    }
}
