//! Per-column vote tallies and cell counts.

use serde::{Deserialize, Serialize};

/// Classifier votes gathered over the non-empty cells of one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnVotes {
    /// Non-empty cells that were classified.
    pub non_empty: usize,
    /// Cells recognised as dates. Zeroed when `has_number_pair` is set.
    pub date: usize,
    /// Cells recognised as plain numbers.
    pub numeric: usize,
    /// Cells recognised as measurements.
    pub measurement: usize,
    /// Everything else, including booleans and number/number values.
    pub text: usize,
    /// At least one cell looked like `123/456` or `12-34`.
    pub has_number_pair: bool,
}

impl ColumnVotes {
    /// Share of non-empty cells voting for the numeric bucket
    /// (plain numbers plus measurements).
    pub fn numeric_ratio(&self) -> f64 {
        self.ratio(self.numeric + self.measurement)
    }

    /// Share of non-empty cells voting date.
    pub fn date_ratio(&self) -> f64 {
        self.ratio(self.date)
    }

    fn ratio(&self, count: usize) -> f64 {
        if self.non_empty == 0 {
            0.0
        } else {
            count as f64 / self.non_empty as f64
        }
    }
}

/// Cell counts for a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCounts {
    pub total: usize,
    pub empty: usize,
    pub non_empty: usize,
}
