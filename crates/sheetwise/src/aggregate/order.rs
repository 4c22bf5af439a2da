//! Ordering and thinning of aggregated rows for visual consumers.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::input::CellValue;

use super::request::AggregatedRow;

/// Row cap above which [`downsample`] thins a series.
pub const DEFAULT_DOWNSAMPLE_CAP: usize = 2000;

/// What to sort aggregated rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// The first dimension's value.
    Dimension,
    /// The first measure's value.
    Measure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort of aggregated rows. Numbers compare numerically, anything
/// else by case-folded display text with exact text breaking ties.
/// Accented letters order by code point, not by locale collation.
pub fn sort_rows(rows: &mut [AggregatedRow], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Dimension => compare_cells(first_dimension(a), first_dimension(b)),
            SortKey::Measure => first_measure(a).total_cmp(&first_measure(b)),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn first_dimension(row: &AggregatedRow) -> Option<&CellValue> {
    row.dimensions.values().next()
}

fn first_measure(row: &AggregatedRow) -> f64 {
    row.values.values().next().copied().unwrap_or(0.0)
}

fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (Some(CellValue::Number(x)), Some(CellValue::Number(y))) => x.total_cmp(y),
        _ => {
            let a = a.map(CellValue::display_string).unwrap_or_default();
            let b = b.map(CellValue::display_string).unwrap_or_default();
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(&b))
        }
    }
}

/// Keep every `ceil(len / cap)`-th item so at most `cap` remain. Lossy.
pub fn downsample<T: Clone>(rows: &[T], cap: usize) -> Vec<T> {
    let cap = cap.max(1);
    if rows.len() <= cap {
        return rows.to_vec();
    }
    let stride = rows.len().div_ceil(cap);
    rows.iter().step_by(stride).cloned().collect()
}
