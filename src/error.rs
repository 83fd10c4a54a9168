use std::path::PathBuf;
use thiserror::Error;

pub type FixerResult<T> = Result<T, FixerError>;

#[derive(Error, Debug)]
pub enum FixerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open workbook {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No sheet selected")]
    NoActiveSheet,

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("'{column}' column not found in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, column: String },

    #[error("Row {row} is out of range (sheet has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<rust_xlsxwriter::XlsxError> for FixerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        FixerError::Export(err.to_string())
    }
}
