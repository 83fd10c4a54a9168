use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Display format for committed date cells (`DD-MM-YYYY`)
pub const DATE_DISPLAY_FORMAT: &str = "%d-%m-%Y";

//==============================================================================
// Cell Values
//==============================================================================

/// A single cell. Loosely typed spreadsheet data is kept as an explicit variant
/// so the date normalizer can move a column from `Text`/`Number` to `Date` and back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Calendar date; time of day is never kept
    Date(NaiveDate),
}

impl CellValue {
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_DISPLAY_FORMAT)),
        }
    }
}

/// Format a number for display without a trailing `.0` on whole values
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

//==============================================================================
// Columns and Sheets
//==============================================================================

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
    /// Set once the date normalizer commits this column
    pub is_date: bool,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
            is_date: false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One worksheet: ordered columns of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Sheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Insert a column at `index`, shifting later columns right
    pub fn insert_column(&mut self, index: usize, column: Column) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Names of columns tagged as date columns, in column order
    pub fn date_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_date)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |col| col.len())
    }

    /// Display strings for one row, in column order
    pub fn row_display(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.values.get(row).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> Result<(), String> {
        let row_count = self.row_count();
        for column in &self.columns {
            if column.len() != row_count {
                return Err(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name,
                    column.len(),
                    row_count
                ));
            }
        }
        Ok(())
    }
}

//==============================================================================
// Views
//==============================================================================

/// Rendered grid of a sheet: every cell already stringified for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetView {
    pub sheet: String,
    pub columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetView {
    pub fn from_sheet(sheet: &Sheet) -> Self {
        Self {
            sheet: sheet.name.clone(),
            columns: sheet.column_names(),
            date_columns: sheet.date_columns(),
            rows: (0..sheet.row_count()).map(|r| sheet.row_display(r)).collect(),
        }
    }

    /// Keep only the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            sheet: self.sheet.clone(),
            columns: self.columns.clone(),
            date_columns: self.date_columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }
}

//==============================================================================
// Progress
//==============================================================================

/// Synchronous progress notice, emitted once per sheet during load and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub label: String,
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn new<S: Into<String>>(label: S, current: usize, total: usize) -> Self {
        Self {
            label: label.into(),
            current,
            total,
        }
    }

    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.current * 100 / self.total
        }
    }
}
