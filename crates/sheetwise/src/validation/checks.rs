//! Quality checks run against a cleaned table.

use std::collections::HashSet;

use crate::inference::{parse_strict_date, parse_strict_number};
use crate::input::{CellValue, DataTable};
use crate::schema::ColumnMetadata;

use super::issue::{IssueKind, QualityIssue, Severity};

/// Row indices kept as samples on an issue.
const SAMPLE_ROWS: usize = 5;

/// Trait for quality checks.
pub trait QualityCheck {
    /// Short identifier recorded on every issue the check raises.
    fn name(&self) -> &'static str;

    /// Run the check and return issues.
    fn check(&self, table: &DataTable, metadata: &ColumnMetadata) -> Vec<QualityIssue>;
}

/// Flags rows identical to an earlier row across all columns.
pub struct DuplicateRowCheck {
    /// Fixed penalty, whatever the number of duplicates.
    pub penalty: u32,
    /// Share of rows above which duplicates are high severity.
    pub high_ratio: f64,
}

impl Default for DuplicateRowCheck {
    fn default() -> Self {
        Self {
            penalty: 10,
            high_ratio: 0.1,
        }
    }
}

impl QualityCheck for DuplicateRowCheck {
    fn name(&self) -> &'static str {
        "duplicate_rows"
    }

    fn check(&self, table: &DataTable, _metadata: &ColumnMetadata) -> Vec<QualityIssue> {
        let mut seen = HashSet::new();
        let duplicates: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !seen.insert(table.row_fingerprint(row)))
            .map(|(idx, _)| idx)
            .collect();

        if duplicates.is_empty() {
            return Vec::new();
        }

        let count = duplicates.len();
        let severity = if count as f64 > table.row_count() as f64 * self.high_ratio {
            Severity::High
        } else {
            Severity::Medium
        };

        vec![
            QualityIssue::new(
                IssueKind::DuplicateRow,
                severity,
                format!("Found {} duplicate rows.", count),
            )
            .with_count(count)
            .with_suggestion("Remove duplicate rows.")
            .with_penalty(self.penalty)
            .with_sample_rows(duplicates.into_iter().take(SAMPLE_ROWS).collect())
            .with_check(self.name()),
        ]
    }
}

/// Flags columns with too many null or empty cells.
pub struct MissingValueCheck {
    /// Missing share a column must exceed to be reported.
    pub flag_ratio: f64,
    /// Missing share above which the issue is high severity.
    pub high_ratio: f64,
    pub low_penalty: u32,
    pub high_penalty: u32,
}

impl Default for MissingValueCheck {
    fn default() -> Self {
        Self {
            flag_ratio: 0.05,
            high_ratio: 0.2,
            low_penalty: 2,
            high_penalty: 5,
        }
    }
}

impl QualityCheck for MissingValueCheck {
    fn name(&self) -> &'static str {
        "missing_values"
    }

    fn check(&self, table: &DataTable, _metadata: &ColumnMetadata) -> Vec<QualityIssue> {
        let total = table.row_count();
        if total == 0 {
            return Vec::new();
        }

        let mut issues = Vec::new();
        for column in &table.columns {
            let missing: Vec<usize> = table
                .column_values(column)
                .enumerate()
                .filter(|(_, v)| v.is_empty())
                .map(|(idx, _)| idx)
                .collect();

            let ratio = missing.len() as f64 / total as f64;
            if ratio <= self.flag_ratio {
                continue;
            }

            let (severity, penalty) = if ratio > self.high_ratio {
                (Severity::High, self.high_penalty)
            } else {
                (Severity::Low, self.low_penalty)
            };

            issues.push(
                QualityIssue::new(
                    IssueKind::Missing,
                    severity,
                    format!("Column '{}' has {} missing values.", column, missing.len()),
                )
                .with_column(column)
                .with_count(missing.len())
                .with_suggestion("Fill missing values.")
                .with_penalty(penalty)
                .with_sample_rows(missing.into_iter().take(SAMPLE_ROWS).collect())
                .with_check(self.name()),
            );
        }
        issues
    }
}

/// Flags date-like text that fails strict validation in columns that also
/// hold valid dates.
#[derive(Default)]
pub struct InvalidDateCheck;

impl QualityCheck for InvalidDateCheck {
    fn name(&self) -> &'static str {
        "invalid_dates"
    }

    fn check(&self, table: &DataTable, _metadata: &ColumnMetadata) -> Vec<QualityIssue> {
        let mut issues = Vec::new();

        for column in &table.columns {
            let mut valid = 0usize;
            let mut invalid = Vec::new();

            for (idx, value) in table.column_values(column).enumerate() {
                let Some(text) = value.as_str() else {
                    continue;
                };
                if text.is_empty() || !(text.contains('/') || text.contains('-')) {
                    continue;
                }
                if parse_strict_date(text).is_some() {
                    valid += 1;
                } else {
                    invalid.push(idx);
                }
            }

            if valid == 0 || invalid.is_empty() {
                continue;
            }

            issues.push(
                QualityIssue::new(
                    IssueKind::InvalidDate,
                    Severity::Medium,
                    format!("Invalid or mixed date formats in column '{}'", column),
                )
                .with_column(column)
                .with_count(invalid.len())
                .with_suggestion("Standardize dates to a single format.")
                .with_sample_rows(invalid.into_iter().take(SAMPLE_ROWS).collect())
                .with_check(self.name()),
            );
        }
        issues
    }
}

/// Flags columns with a significant share of both numbers and text.
pub struct MixedTypeCheck {
    /// Share of rows each kind must exceed.
    pub min_ratio: f64,
}

impl Default for MixedTypeCheck {
    fn default() -> Self {
        Self { min_ratio: 0.05 }
    }
}

impl QualityCheck for MixedTypeCheck {
    fn name(&self) -> &'static str {
        "mixed_types"
    }

    fn check(&self, table: &DataTable, _metadata: &ColumnMetadata) -> Vec<QualityIssue> {
        let floor = table.row_count() as f64 * self.min_ratio;
        let mut issues = Vec::new();

        for column in &table.columns {
            let mut numbers = 0usize;
            let mut texts = 0usize;
            for value in table.column_values(column) {
                match value {
                    CellValue::Number(_) => numbers += 1,
                    CellValue::Text(s) if s.is_empty() => {}
                    CellValue::Text(s) if parse_strict_number(s.trim()).is_some() => numbers += 1,
                    CellValue::Text(_) => texts += 1,
                    CellValue::Null | CellValue::Bool(_) => {}
                }
            }

            if numbers as f64 > floor && texts as f64 > floor {
                issues.push(
                    QualityIssue::new(
                        IssueKind::MixedTypes,
                        Severity::Medium,
                        format!("Column '{}' contains mixed numeric and text values", column),
                    )
                    .with_column(column)
                    .with_count(numbers.min(texts))
                    .with_suggestion("Convert the column to a single type.")
                    .with_check(self.name()),
                );
            }
        }
        issues
    }
}
