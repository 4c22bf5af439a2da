//! Quality report types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

use super::issue::{IssueKind, QualityIssue, Severity};

/// Per-column counts shown next to the issue list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Null or empty cells.
    pub missing: usize,
    /// Distinct non-empty values.
    pub unique: usize,
    pub column_type: ColumnType,
    pub total: usize,
    pub non_empty: usize,
}

/// Result of analyzing a table. Always rebuilt from scratch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0 to 100.
    pub score: u32,
    pub total_rows: usize,
    pub issues: Vec<QualityIssue>,
    pub column_stats: IndexMap<String, ColumnStats>,
}

impl QualityReport {
    pub fn total_issues(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Issues of one kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Issues raised against one column.
    pub fn issues_for<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a QualityIssue> + 'a {
        self.issues
            .iter()
            .filter(move |i| i.column.as_deref() == Some(column))
    }

    /// Highest severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }
}
