//! Column type detection by majority vote over classified cells.

use tracing::debug;

use crate::error::{Result, SheetwiseError};
use crate::input::{CellValue, DataTable};
use crate::schema::{ColumnCounts, ColumnMetadata, ColumnType, ColumnVotes};

use super::classifier::{CellClass, CellClassifier};
use super::dates;

/// Share of non-empty cells a type must exceed to win a column.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Votes on the dominant type of each column.
#[derive(Debug, Clone)]
pub struct ColumnTypeDetector {
    classifier: CellClassifier,
    /// A bucket must hold strictly more than this share of non-empty cells.
    threshold: f64,
}

impl ColumnTypeDetector {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self {
            classifier: CellClassifier::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Create a detector around an existing classifier.
    pub fn with_classifier(classifier: CellClassifier) -> Self {
        Self {
            classifier,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Use a different majority threshold. Must lie in `(0, 1]`.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(SheetwiseError::Config(format!(
                "classification threshold {} is outside (0, 1]",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify every column of a table.
    pub fn detect(&self, table: &DataTable) -> ColumnMetadata {
        let mut metadata = ColumnMetadata::default();

        for name in &table.columns {
            let votes = self.tally(table.column_values(name));
            let column_type = self.decide(&votes);

            debug!(
                column = %name,
                column_type = column_type.label(),
                non_empty = votes.non_empty,
                date = votes.date,
                numeric = votes.numeric,
                measurement = votes.measurement,
                text = votes.text,
                "classified column"
            );

            metadata.insert(name, column_type, votes);
            metadata
                .column_counts
                .insert(name.clone(), count_cells(table, name));
        }

        metadata
    }

    /// Classify a single column by name. Unknown columns are text.
    pub fn detect_column(&self, table: &DataTable, name: &str) -> (ColumnType, ColumnVotes) {
        let votes = self.tally(table.column_values(name));
        (self.decide(&votes), votes)
    }

    /// Tally classifier votes over a column's values.
    pub fn tally<'a>(&self, values: impl IntoIterator<Item = &'a CellValue>) -> ColumnVotes {
        let mut votes = ColumnVotes::default();

        for value in values {
            if let CellValue::Text(s) = value {
                if dates::is_number_pair(s) {
                    votes.has_number_pair = true;
                    votes.non_empty += 1;
                    votes.text += 1;
                    continue;
                }
            }

            match self.classifier.classify(value) {
                CellClass::Empty => continue,
                CellClass::Date(_) => votes.date += 1,
                CellClass::Number(_) => votes.numeric += 1,
                CellClass::Measurement { .. } => votes.measurement += 1,
                CellClass::Boolean(_) | CellClass::Text => votes.text += 1,
            }
            votes.non_empty += 1;
        }

        // One fraction-like value is enough to distrust every date vote.
        if votes.has_number_pair {
            votes.date = 0;
        }

        votes
    }

    /// Pick the column type from a vote tally.
    pub fn decide(&self, votes: &ColumnVotes) -> ColumnType {
        if votes.non_empty == 0 {
            return ColumnType::Text;
        }

        if votes.date_ratio() > self.threshold {
            ColumnType::Date
        } else if votes.numeric_ratio() > self.threshold {
            if votes.measurement > votes.numeric {
                ColumnType::Measurement
            } else {
                ColumnType::Numeric
            }
        } else {
            ColumnType::Text
        }
    }
}

impl Default for ColumnTypeDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Empty/non-empty counts for one column.
pub fn count_cells(table: &DataTable, name: &str) -> ColumnCounts {
    let total = table.row_count();
    let non_empty = table.column_values(name).filter(|v| !v.is_empty()).count();
    ColumnCounts {
        total,
        empty: total - non_empty,
        non_empty,
    }
}
