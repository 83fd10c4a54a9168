//! Sheet heuristics: header detection, date normalization, flags, search

pub mod dates;
pub mod flags;
pub mod header;
pub mod search;

pub use dates::{normalize_column, parse_date_value, DateColumnOutcome, DateStrategy};
pub use flags::add_flags;
pub use header::{build_columns, drop_duplicate_header, locate_header_row, DEFAULT_MAX_SCAN};
pub use search::filter_rows;
