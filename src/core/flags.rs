//! Long/short term flag column derived from "Asset Type"

use crate::error::{FixerError, FixerResult};
use crate::types::{CellValue, Column, Sheet};
use tracing::info;

pub const ASSET_TYPE_COLUMN: &str = "Asset Type";
pub const FLAG_COLUMN: &str = "Flag";

/// Map one Asset Type value to its flag
pub fn flag_for(asset_type: &CellValue) -> &'static str {
    match asset_type.to_string().trim().to_lowercase().as_str() {
        "long term" => "yes",
        "short term" => "no",
        _ => "",
    }
}

/// Insert a "Flag" column right after "Asset Type".
///
/// Returns `Ok(false)` without touching the sheet when the flag column is
/// already present.
pub fn add_flags(sheet: &mut Sheet) -> FixerResult<bool> {
    let asset_idx = sheet
        .column_index(ASSET_TYPE_COLUMN)
        .ok_or_else(|| FixerError::ColumnNotFound {
            sheet: sheet.name.clone(),
            column: ASSET_TYPE_COLUMN.to_string(),
        })?;

    if sheet.column(FLAG_COLUMN).is_some() {
        return Ok(false);
    }

    let values = sheet.columns[asset_idx]
        .values
        .iter()
        .map(|v| CellValue::text(flag_for(v)))
        .collect();

    sheet.insert_column(asset_idx + 1, Column::new(FLAG_COLUMN, values));
    info!(sheet = %sheet.name, "flags added next to {}", ASSET_TYPE_COLUMN);
    Ok(true)
}
