//! datefix - Excel date fixer
//!
//! Loads Excel workbooks, finds the real header row of each sheet, turns
//! columns of mixed-format dates into calendar dates, and writes the
//! workbook back out with date columns formatted `DD-MM-YYYY`.
//!
//! # Features
//!
//! - Header row detection (title blocks above the table are skipped)
//! - Date normalization: `YYYYMMDD`, `DDMMYYYY`, then day-first parsing,
//!   committed only when at least 30% of the column parses
//! - Long/Short term flag column derived from "Asset Type"
//! - Search, cell edits, and tab-separated copy/paste on loaded sheets
//! - Export to .xlsx with per-sheet column order preserved
//!
//! # Example
//!
//! ```no_run
//! use datefix::config::FixerConfig;
//! use datefix::session::Session;
//!
//! let mut session = Session::new(FixerConfig::default());
//! let report = session.load_files(["statement.xlsx"], |p| println!("{}", p.label));
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.path.display(), failure.error);
//! }
//!
//! for workbook in session.workbooks() {
//!     workbook.export("statement_fixed.xlsx", |_| {})?;
//! }
//! # Ok::<(), datefix::error::FixerError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{FixerError, FixerResult};
pub use session::{Session, Workbook};
pub use types::{CellValue, Column, Sheet, SheetView};
