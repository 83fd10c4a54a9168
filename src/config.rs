//! Runtime settings. There are no config files; values come from CLI flags.

use crate::core::header::DEFAULT_MAX_SCAN;

/// Rows rendered by `show` before truncating
pub const DEFAULT_PREVIEW_LIMIT: usize = 500;

/// Suffix appended to the file stem of exported workbooks
pub const DEFAULT_EXPORT_SUFFIX: &str = "_fixed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixerConfig {
    /// Leading rows searched for the header row
    pub max_scan_rows: usize,
    pub preview_limit: usize,
    pub export_suffix: String,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            max_scan_rows: DEFAULT_MAX_SCAN,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            export_suffix: DEFAULT_EXPORT_SUFFIX.to_string(),
        }
    }
}

impl FixerConfig {
    #[must_use]
    pub fn with_max_scan_rows(mut self, rows: usize) -> Self {
        self.max_scan_rows = rows;
        self
    }

    #[must_use]
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    #[must_use]
    pub fn with_export_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.export_suffix = suffix.into();
        self
    }
}
