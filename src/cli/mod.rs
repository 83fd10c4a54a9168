//! CLI command handlers

pub mod commands;

pub use commands::{copy_column, edit, fix, flag, inspect, parse_edits, paste, show, CellEdit};
