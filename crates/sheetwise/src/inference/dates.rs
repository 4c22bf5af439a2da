//! Strict date recognition.
//!
//! Only a handful of explicit shapes count as dates. Anything a lenient date
//! parser would accept beyond these (bare numbers, ID-like pairs, free text)
//! stays non-date so that codes and fractions are not silently rewritten.

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

/// Two digit groups separated by `/` or `-` (`2511/1122`, `777-333`).
static NUMBER_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[/-][0-9]+$").unwrap());

/// `YYYY-MM-DD` or `YYYY/MM/DD`.
static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})$").unwrap());

/// `DD-MM-YYYY`, `MM/DD/YY`, `DD.MM.YYYY`.
static PART_PART_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})[-/.]([0-9]{1,2})[-/.]([0-9]{2,4})$").unwrap());

/// `30-Jun-25`, `30 Jun 2025`.
static DAY_MONTH_NAME_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})[-/.\s]+([A-Za-z]{3})[-/.\s]+([0-9]{2,4})$").unwrap()
});

/// `Jun-30-25`, `Jun 30 2025`.
static MONTH_NAME_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{3})[-/.\s]+([0-9]{1,2})[-/.\s]+([0-9]{2,4})$").unwrap()
});

static PURE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Day zero of spreadsheet serial dates.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// How canonical dates are written back into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `YYYY-MM-DD`.
    #[default]
    Iso,
    /// `DD-MM-YYYY`.
    DayMonthYear,
}

impl DateStyle {
    /// Render a date in this style.
    pub fn format(&self, date: NaiveDate) -> String {
        match self {
            DateStyle::Iso => date.format("%Y-%m-%d").to_string(),
            DateStyle::DayMonthYear => date.format("%d-%m-%Y").to_string(),
        }
    }
}

/// Check for the number/number shape that must never be read as a date.
pub fn is_number_pair(value: &str) -> bool {
    NUMBER_PAIR.is_match(value.trim())
}

/// Parse one of the accepted date shapes, rejecting impossible calendar
/// values. Returns `None` for number/number values.
pub fn parse_strict_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() || is_number_pair(value) {
        return None;
    }

    if let Some(caps) = YEAR_MONTH_DAY.captures(value) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = calendar_date(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = PART_PART_YEAR.captures(value) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        // Day-month first; month-day only when that is the plausible order.
        if let Some(date) = calendar_date(year, second, first).or_else(|| calendar_date(year, first, second)) {
            return Some(date);
        }
    }

    if let Some(caps) = DAY_MONTH_NAME_YEAR.captures(value) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_abbreviation(&caps[2])?;
        let year = expand_year(&caps[3])?;
        if let Some(date) = calendar_date(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = MONTH_NAME_DAY_YEAR.captures(value) {
        let month = month_from_abbreviation(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        if let Some(date) = calendar_date(year, month, day) {
            return Some(date);
        }
    }

    None
}

/// Interpret a pure-digit string as a spreadsheet serial day count when it
/// falls inside `[min, max]`.
pub fn parse_serial_date(value: &str, min: f64, max: f64) -> Option<NaiveDate> {
    let value = value.trim();
    if !PURE_DIGITS.is_match(value) {
        return None;
    }
    let serial: u64 = value.parse().ok()?;
    let as_float = serial as f64;
    if as_float < min || as_float > max {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial))
}

/// Serial day count for a date (inverse of [`parse_serial_date`]).
pub fn to_serial(date: NaiveDate) -> i64 {
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)
        .map(|epoch| (date - epoch).num_days())
        .unwrap_or_default()
}

fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn expand_year(digits: &str) -> Option<i32> {
    let year: i32 = digits.parse().ok()?;
    if digits.len() == 2 {
        Some(if year < 70 { 2000 + year } else { 1900 + year })
    } else {
        Some(year)
    }
}

fn month_from_abbreviation(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
