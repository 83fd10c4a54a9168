//! Excel import/export
//!
//! - Import: any calamine-readable workbook → sheets with detected headers
//!   and normalized date columns
//! - Export: sheets → .xlsx with `DD-MM-YYYY` formatting on date columns

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::{cell_from_data, ExcelImporter, ImportedSheet};
