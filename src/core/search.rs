//! Free-text row filter over the display grid

use crate::types::SheetView;

/// Indices of rows where any cell contains `keyword` (case-insensitive).
/// An empty keyword matches every row.
pub fn filter_rows(view: &SheetView, keyword: &str) -> Vec<usize> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return (0..view.rows.len()).collect();
    }

    view.rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| cell.to_lowercase().contains(&keyword)))
        .map(|(idx, _)| idx)
        .collect()
}
