//! Lenient numeric coercion for aggregation.
//!
//! Unlike the cell classifier this never refuses a value: charts must
//! render on dirty input, so anything unparseable counts as zero.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::CellValue;

/// Everything that is not a digit, dot or minus sign.
static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.\-]").unwrap());

/// Leading decimal literal, used for percentages (`"12.5%"`).
static LEADING_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:[0-9]+\.?[0-9]*|\.[0-9]+)").unwrap());

/// Coerce a cell to a number: typed numbers pass through, currency symbols
/// and thousands separators are stripped, a trailing `%` divides by 100 and
/// anything else is `0`.
pub fn clean_numeric(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Text(s) => clean_numeric_str(s),
        _ => 0.0,
    }
}

/// [`clean_numeric`] over raw text.
pub fn clean_numeric_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let cleaned = NON_NUMERIC.replace_all(trimmed, "");

    if trimmed.ends_with('%') {
        return LEADING_DECIMAL
            .find(&cleaned)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map(|n| n / 100.0)
            .unwrap_or(0.0);
    }

    if cleaned.is_empty() || cleaned.matches('.').count() > 1 {
        return 0.0;
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Round to two decimal places; `-0` becomes `0`.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
