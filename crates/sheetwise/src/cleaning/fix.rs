//! Explicit, caller-triggered repairs for the problems the quality report
//! points at. Unlike the cleaning pipeline, this may drop rows and columns.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inference::{DateStyle, parse_strict_date};
use crate::input::{CellValue, DataTable, Row};

/// Placeholder written into cells that were missing.
pub const FILL_VALUE: &str = "N/A";

/// Share of non-placeholder values that must be dates before a column's
/// dates are standardized.
const DATE_COLUMN_RATIO: f64 = 0.3;

/// Outcome of [`fix_quality`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixResult {
    pub table: DataTable,
    /// One human-readable message per applied fix.
    pub fixes: Vec<String>,
}

/// Apply every automatic fix in order: drop empty rows, drop duplicate rows,
/// drop empty columns, fill missing cells, standardize dates, and turn
/// mixed-type columns into text.
pub fn fix_quality(table: &DataTable) -> FixResult {
    let mut fixes = Vec::new();
    let mut rows = table.rows.clone();
    let mut columns = table.columns.clone();

    let before = rows.len();
    rows.retain(|row| row.values().any(|v| !v.is_empty()));
    let removed = before - rows.len();
    if removed > 0 {
        fixes.push(format!("Removed {} empty rows", removed));
    }

    let before = rows.len();
    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(table.row_fingerprint(row)));
    let removed = before - rows.len();
    if removed > 0 {
        fixes.push(format!("Removed {} duplicate rows", removed));
    }

    let empty_columns: Vec<String> = columns
        .iter()
        .filter(|name| rows.iter().all(|row| row.get(*name).is_none_or(CellValue::is_empty)))
        .cloned()
        .collect();
    if !empty_columns.is_empty() {
        columns.retain(|name| !empty_columns.contains(name));
        for row in &mut rows {
            for name in &empty_columns {
                row.shift_remove(name);
            }
        }
        fixes.push(format!(
            "Removed {} empty columns: {}",
            empty_columns.len(),
            empty_columns.join(", ")
        ));
    }

    let mut filled = 0usize;
    for row in &mut rows {
        for value in row.values_mut() {
            if value.is_empty() {
                *value = CellValue::text(FILL_VALUE);
                filled += 1;
            }
        }
    }
    if filled > 0 {
        fixes.push(format!("Filled {} missing values with '{}'", filled, FILL_VALUE));
    }

    for name in &columns {
        let changed = standardize_date_column(&mut rows, name);
        if changed > 0 {
            fixes.push(format!("Standardized {} dates in column '{}'", changed, name));
        }
    }

    for name in &columns {
        if is_mixed_column(&rows, name) {
            for row in &mut rows {
                if let Some(value) = row.get_mut(name) {
                    if !is_placeholder(value) {
                        *value = CellValue::Text(value.display_string());
                    }
                }
            }
            fixes.push(format!("Converted column '{}' to text", name));
        }
    }

    info!(fixes = fixes.len(), rows = rows.len(), "applied automatic fixes");

    FixResult {
        table: DataTable { columns, rows },
        fixes,
    }
}

fn is_placeholder(value: &CellValue) -> bool {
    value.as_str() == Some(FILL_VALUE)
}

/// Text cells that strictly parse as a date. Pure digits are left alone so
/// codes are never turned into dates here.
fn text_date(value: &CellValue) -> Option<chrono::NaiveDate> {
    let text = value.as_str()?.trim();
    if text.len() <= 4 || text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    parse_strict_date(text)
}

fn standardize_date_column(rows: &mut [Row], name: &str) -> usize {
    let candidates: Vec<&CellValue> = rows
        .iter()
        .filter_map(|row| row.get(name))
        .filter(|v| !v.is_empty() && !is_placeholder(v))
        .collect();
    if candidates.is_empty() {
        return 0;
    }

    let dates = candidates.iter().filter(|v| text_date(v).is_some()).count();
    if (dates as f64) / (candidates.len() as f64) <= DATE_COLUMN_RATIO {
        return 0;
    }

    let mut changed = 0;
    for row in rows.iter_mut() {
        if let Some(value) = row.get_mut(name) {
            if let Some(date) = text_date(value) {
                let canonical = DateStyle::Iso.format(date);
                if value.as_str() != Some(canonical.as_str()) {
                    *value = CellValue::Text(canonical);
                    changed += 1;
                }
            }
        }
    }
    changed
}

fn is_mixed_column(rows: &[Row], name: &str) -> bool {
    let mut numbers = false;
    let mut texts = false;
    for value in rows.iter().filter_map(|row| row.get(name)) {
        match value {
            CellValue::Number(_) => numbers = true,
            CellValue::Text(_) if !is_placeholder(value) => texts = true,
            _ => {}
        }
    }
    numbers && texts
}
