//! Header row detection and table construction
//!
//! Exported statements often carry a title block above the real header, so
//! the header row is searched for instead of assumed at row 0.

use crate::types::{CellValue, Column};
use std::collections::HashSet;
use tracing::debug;

/// Default number of leading rows scanned for a header
pub const DEFAULT_MAX_SCAN: usize = 30;

/// Lower-cased column names that identify a header row
pub const HEADER_VOCABULARY: [&str; 6] = [
    "stock name",
    "buy date",
    "buydate",
    "sell date",
    "selldate",
    "quantity",
];

/// Return the index of the first row (within `max_scan` rows) containing a
/// known column name. Falls back to row 0 when nothing matches.
pub fn locate_header_row(rows: &[Vec<CellValue>], max_scan: usize) -> usize {
    let window = max_scan.min(rows.len());
    for (idx, row) in rows.iter().take(window).enumerate() {
        let hit = row.iter().any(|cell| {
            let text = cell.to_string().trim().to_lowercase();
            HEADER_VOCABULARY.contains(&text.as_str())
        });
        if hit {
            debug!(row = idx, "header row located");
            return idx;
        }
    }
    0
}

/// Build named columns from raw rows, using `header_row` for names and every
/// row below it as data. Short rows are padded with empty cells.
pub fn build_columns(rows: &[Vec<CellValue>], header_row: usize) -> Vec<Column> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 || header_row >= rows.len() {
        return Vec::new();
    }

    let names = column_names(&rows[header_row], width);
    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column::new(name, Vec::new()))
        .collect();

    for row in &rows[header_row + 1..] {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.values.push(row.get(idx).cloned().unwrap_or_default());
        }
    }

    columns
}

/// Header cells to unique column names. Blank cells become `Unnamed: <i>`,
/// repeats get `.1`, `.2`, ... suffixes.
fn column_names(header: &[CellValue], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(width);

    for idx in 0..width {
        let raw = header
            .get(idx)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default();
        let base = if raw.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

/// Drop the first data row when it repeats the header text (double-header
/// artifact of some export tools). Returns true if a row was dropped.
pub fn drop_duplicate_header(columns: &mut [Column]) -> bool {
    if columns.is_empty() || columns.iter().any(|c| c.values.is_empty()) {
        return false;
    }

    let duplicated = columns
        .iter()
        .all(|c| c.values[0].to_string().trim().to_lowercase() == c.name.to_lowercase());

    if duplicated {
        for column in columns.iter_mut() {
            column.values.remove(0);
        }
    }
    duplicated
}
