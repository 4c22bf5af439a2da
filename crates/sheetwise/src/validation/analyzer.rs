//! Runs the quality checks and scores the table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SheetwiseError};
use crate::input::DataTable;
use crate::schema::ColumnMetadata;

use super::checks::{
    DuplicateRowCheck, InvalidDateCheck, MissingValueCheck, MixedTypeCheck, QualityCheck,
};
use super::report::{ColumnStats, QualityReport};

/// Thresholds and penalties for quality scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Points removed when any duplicate row exists.
    pub duplicate_penalty: u32,
    /// Share of rows above which duplicates are high severity.
    pub duplicate_high_ratio: f64,
    /// Missing share a column must exceed to be reported.
    pub missing_flag_ratio: f64,
    /// Missing share above which the issue is high severity.
    pub missing_high_ratio: f64,
    pub missing_low_penalty: u32,
    pub missing_high_penalty: u32,
    /// Share of rows both numbers and text must exceed for a mixed column.
    pub mixed_type_ratio: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            duplicate_penalty: 10,
            duplicate_high_ratio: 0.1,
            missing_flag_ratio: 0.05,
            missing_high_ratio: 0.2,
            missing_low_penalty: 2,
            missing_high_penalty: 5,
            mixed_type_ratio: 0.05,
        }
    }
}

impl QualityConfig {
    /// Check that every ratio lies in `[0, 1]` and the missing bands are ordered.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("duplicate_high_ratio", self.duplicate_high_ratio),
            ("missing_flag_ratio", self.missing_flag_ratio),
            ("missing_high_ratio", self.missing_high_ratio),
            ("mixed_type_ratio", self.mixed_type_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(SheetwiseError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        if self.missing_flag_ratio > self.missing_high_ratio {
            return Err(SheetwiseError::Config(
                "missing_flag_ratio must not exceed missing_high_ratio".to_string(),
            ));
        }
        Ok(())
    }
}

/// Produces a [`QualityReport`] from a cleaned table and its metadata.
pub struct QualityAnalyzer {
    checks: Vec<Box<dyn QualityCheck>>,
}

impl QualityAnalyzer {
    /// Create an analyzer with the default checks and thresholds.
    pub fn new() -> Self {
        Self::with_config(&QualityConfig::default())
    }

    /// Create an analyzer with custom thresholds.
    pub fn with_config(config: &QualityConfig) -> Self {
        Self {
            checks: vec![
                Box::new(DuplicateRowCheck {
                    penalty: config.duplicate_penalty,
                    high_ratio: config.duplicate_high_ratio,
                }),
                Box::new(MissingValueCheck {
                    flag_ratio: config.missing_flag_ratio,
                    high_ratio: config.missing_high_ratio,
                    low_penalty: config.missing_low_penalty,
                    high_penalty: config.missing_high_penalty,
                }),
                Box::new(InvalidDateCheck),
                Box::new(MixedTypeCheck {
                    min_ratio: config.mixed_type_ratio,
                }),
            ],
        }
    }

    /// Add an extra check after the built-in ones.
    pub fn with_check(mut self, check: Box<dyn QualityCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Run every check, score the table and gather column statistics.
    pub fn analyze(&self, table: &DataTable, metadata: &ColumnMetadata) -> QualityReport {
        let mut issues = Vec::new();
        for check in &self.checks {
            let found = check.check(table, metadata);
            debug!(check = check.name(), issues = found.len(), "ran quality check");
            issues.extend(found);
        }

        let penalties: u32 = issues.iter().map(|i| i.penalty).sum();
        let score = 100u32.saturating_sub(penalties);

        // Highest severity first; stable so check order is kept within a level.
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));

        let column_stats = table
            .columns
            .iter()
            .map(|name| (name.clone(), column_stats(table, metadata, name)))
            .collect();

        QualityReport {
            score,
            total_rows: table.row_count(),
            issues,
            column_stats,
        }
    }
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn column_stats(table: &DataTable, metadata: &ColumnMetadata, name: &str) -> ColumnStats {
    let mut distinct = HashSet::new();
    let mut non_empty = 0usize;
    for value in table.column_values(name).filter(|v| !v.is_empty()) {
        non_empty += 1;
        distinct.insert(value.fingerprint());
    }

    let total = table.row_count();
    ColumnStats {
        missing: total - non_empty,
        unique: distinct.len(),
        column_type: metadata.column_type(name),
        total,
        non_empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CellValue;
    use crate::schema::ColumnType;
    use crate::validation::{IssueKind, Severity};

    fn records(rows: Vec<Vec<CellValue>>) -> DataTable {
        DataTable::from_records(vec!["region".into(), "sales".into()], rows)
    }

    #[test]
    fn test_clean_table_scores_100() {
        let table = records(vec![
            vec!["N".into(), 10.into()],
            vec!["S".into(), 5.into()],
        ]);
        let report = QualityAnalyzer::new().analyze(&table, &ColumnMetadata::default());
        assert_eq!(report.score, 100);
        assert!(!report.has_issues());
        assert_eq!(report.total_rows, 2);
    }

    #[test]
    fn test_one_duplicate_scores_90() {
        let table = records(vec![
            vec!["N".into(), 10.into()],
            vec!["N".into(), 10.into()],
            vec!["S".into(), 5.into()],
        ]);
        let report = QualityAnalyzer::new().analyze(&table, &ColumnMetadata::default());
        assert_eq!(report.score, 90);
        assert_eq!(report.issues_of(IssueKind::DuplicateRow).count(), 1);
    }

    #[test]
    fn test_score_never_below_zero() {
        let config = QualityConfig {
            duplicate_penalty: 250,
            ..Default::default()
        };
        let table = records(vec![vec!["N".into(), 1.into()], vec!["N".into(), 1.into()]]);
        let report = QualityAnalyzer::with_config(&config).analyze(&table, &ColumnMetadata::default());
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_issues_sorted_by_severity() {
        let mut rows: Vec<Vec<CellValue>> = (0..10i32)
            .map(|i| vec![CellValue::text(format!("R{}", i)), i.into()])
            .collect();
        rows[0][0] = CellValue::Null;
        rows[1][1] = CellValue::Null;
        rows[2][1] = CellValue::Null;
        rows[3][1] = CellValue::Null;
        let report = QualityAnalyzer::new().analyze(&records(rows), &ColumnMetadata::default());

        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].severity, Severity::High);
        assert_eq!(report.issues[0].column.as_deref(), Some("sales"));
        assert_eq!(report.score, 93);
        assert_eq!(report.max_severity(), Some(Severity::High));
    }

    #[test]
    fn test_column_stats() {
        let table = records(vec![
            vec!["N".into(), 10.into()],
            vec!["N".into(), "10".into()],
            vec![CellValue::Null, 5.into()],
        ]);
        let mut metadata = ColumnMetadata::default();
        metadata.insert("sales", ColumnType::Numeric, Default::default());

        let report = QualityAnalyzer::new().analyze(&table, &metadata);
        let region = &report.column_stats["region"];
        assert_eq!(region.missing, 1);
        assert_eq!(region.unique, 1);
        assert_eq!(region.non_empty, 2);
        assert_eq!(region.column_type, ColumnType::Text);

        let sales = &report.column_stats["sales"];
        assert_eq!(sales.unique, 3);
        assert_eq!(sales.column_type, ColumnType::Numeric);
    }

    #[test]
    fn test_config_validation() {
        assert!(QualityConfig::default().validate().is_ok());
        let bad = QualityConfig {
            missing_flag_ratio: 0.5,
            missing_high_ratio: 0.2,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
