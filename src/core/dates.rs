//! Date column normalization
//!
//! Each value is run through an ordered chain of parse strategies (first
//! success wins). The column is only rewritten when enough values parse;
//! otherwise it is left exactly as loaded.

use crate::types::{CellValue, Column};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

/// Fraction of the column that must parse before it is committed
pub const COVERAGE_THRESHOLD: f64 = 0.3;

// Dates outside this window are treated as misparses
const MIN_YEAR: i32 = 1677;
const MAX_YEAR: i32 = 2262;

/// Day-first formats, tried in order. Two-digit years come before four-digit
/// ones so `3/4/21` is not read as year 21.
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%m-%y",
    "%d/%m/%y",
    "%d.%m.%y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b, %Y",
    "%b %d, %Y",
    "%b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Last resort for values that are not valid day-first (`12/31/2020`)
const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%m/%d/%Y", "%m-%d-%Y"];

/// Which strategy produced a parsed date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateStrategy {
    /// Cell was already a date when loaded
    Native,
    /// First 8-digit run read as `YYYYMMDD`
    YearMonthDay,
    /// First 8-digit run read as `DDMMYYYY`
    DayMonthYear,
    /// General day-first parse of the whole value
    DayFirst,
}

/// A value prepared for the strategy chain
struct Candidate<'a> {
    text: &'a str,
    digits: Option<&'a str>,
}

type Strategy = fn(&Candidate<'_>) -> Option<NaiveDate>;

const STRATEGIES: [(DateStrategy, Strategy); 3] = [
    (DateStrategy::YearMonthDay, parse_year_month_day),
    (DateStrategy::DayMonthYear, parse_day_month_year),
    (DateStrategy::DayFirst, parse_day_first),
];

fn eight_digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{8}").expect("valid regex"))
}

fn in_range(date: NaiveDate) -> Option<NaiveDate> {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

fn digits_to_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year = year.parse().ok()?;
    let month = month.parse().ok()?;
    let day = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(in_range)
}

fn parse_year_month_day(candidate: &Candidate<'_>) -> Option<NaiveDate> {
    let d = candidate.digits?;
    digits_to_date(&d[0..4], &d[4..6], &d[6..8])
}

fn parse_day_month_year(candidate: &Candidate<'_>) -> Option<NaiveDate> {
    let d = candidate.digits?;
    digits_to_date(&d[4..8], &d[2..4], &d[0..2])
}

fn parse_day_first(candidate: &Candidate<'_>) -> Option<NaiveDate> {
    let text = candidate.text;
    // Bare numbers are ids, amounts or serials, never dates here
    if text.is_empty() || text.parse::<f64>().is_ok() {
        return None;
    }

    DAY_FIRST_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok().and_then(in_range))
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(text, fmt)
                    .ok()
                    .and_then(|dt| in_range(dt.date()))
            })
        })
        .or_else(|| {
            MONTH_FIRST_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok().and_then(in_range))
        })
}

/// Run one cell through the strategy chain
pub fn parse_with_strategy(value: &CellValue) -> Option<(NaiveDate, DateStrategy)> {
    if let CellValue::Date(d) = value {
        return Some((*d, DateStrategy::Native));
    }

    let rendered = value.to_string();
    let text = rendered.trim();
    let candidate = Candidate {
        text,
        digits: eight_digit_run().find(text).map(|m| m.as_str()),
    };

    STRATEGIES
        .iter()
        .find_map(|(strategy, parse)| parse(&candidate).map(|date| (date, *strategy)))
}

/// Parse a single value as a date, if any strategy accepts it
pub fn parse_date_value(value: &CellValue) -> Option<NaiveDate> {
    parse_with_strategy(value).map(|(date, _)| date)
}

/// Minimum parsed count for a column of `len` values: `max(1, floor(len * 0.3))`
pub fn acceptance_threshold(len: usize) -> usize {
    ((len as f64 * COVERAGE_THRESHOLD) as usize).max(1)
}

/// Per-strategy hit counts for one column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyHits {
    pub native: usize,
    pub year_month_day: usize,
    pub day_month_year: usize,
    pub day_first: usize,
}

impl StrategyHits {
    fn record(&mut self, strategy: DateStrategy) {
        match strategy {
            DateStrategy::Native => self.native += 1,
            DateStrategy::YearMonthDay => self.year_month_day += 1,
            DateStrategy::DayMonthYear => self.day_month_year += 1,
            DateStrategy::DayFirst => self.day_first += 1,
        }
    }
}

/// Result of normalizing one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateColumnOutcome {
    pub column: String,
    pub committed: bool,
    pub parsed: usize,
    pub threshold: usize,
    pub total: usize,
    pub hits: StrategyHits,
}

/// Try to turn `column` into a date column.
///
/// On commit every parsed cell becomes [`CellValue::Date`], unparsed cells keep
/// their original value, and the column is tagged. On rejection nothing changes.
pub fn normalize_column(column: &mut Column) -> DateColumnOutcome {
    let parsed: Vec<Option<(NaiveDate, DateStrategy)>> =
        column.values.iter().map(parse_with_strategy).collect();

    let mut hits = StrategyHits::default();
    for (_, strategy) in parsed.iter().flatten() {
        hits.record(*strategy);
    }

    let parsed_count = parsed.iter().filter(|p| p.is_some()).count();
    let threshold = acceptance_threshold(column.len());
    let committed = parsed_count >= threshold;

    if committed {
        for (cell, result) in column.values.iter_mut().zip(parsed) {
            if let Some((date, _)) = result {
                *cell = CellValue::Date(date);
            }
        }
        column.is_date = true;
    }

    let outcome = DateColumnOutcome {
        column: column.name.clone(),
        committed,
        parsed: parsed_count,
        threshold,
        total: column.len(),
        hits,
    };
    debug!(
        column = %outcome.column,
        committed = outcome.committed,
        parsed = outcome.parsed,
        threshold = outcome.threshold,
        "date normalization"
    );
    outcome
}
