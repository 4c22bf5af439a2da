//! Quality issue types.

use serde::{Deserialize, Serialize};

/// Kind of quality issue detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Cells that are null or empty.
    Missing,
    /// Rows structurally identical to an earlier row.
    DuplicateRow,
    /// Date-like text that fails strict date validation.
    InvalidDate,
    /// Numbers and text mixed in one column.
    MixedTypes,
}

impl IssueKind {
    /// Get a human-readable label for the issue kind.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::Missing => "Missing Values",
            IssueKind::DuplicateRow => "Duplicate Rows",
            IssueKind::InvalidDate => "Invalid Date",
            IssueKind::MixedTypes => "Mixed Types",
        }
    }
}

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// One finding about data quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    /// Affected column; `None` for table-wide issues such as duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Number of affected cells or rows.
    pub affected_count: usize,
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
    /// What the user can do about it.
    pub suggestion: String,
    /// Points this issue removes from the quality score.
    pub penalty: u32,
    /// A few affected row indices.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sample_rows: Vec<usize>,
    /// Which check raised the issue.
    pub check: String,
}

impl QualityIssue {
    /// Create a new issue.
    pub fn new(kind: IssueKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind,
            column: None,
            affected_count: 0,
            severity,
            description: description.into(),
            suggestion: String::new(),
            penalty: 0,
            sample_rows: Vec::new(),
            check: String::new(),
        }
    }

    /// Set the affected column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the affected count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.affected_count = count;
        self
    }

    /// Set the suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Set the score penalty.
    pub fn with_penalty(mut self, penalty: u32) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set sample rows.
    pub fn with_sample_rows(mut self, rows: Vec<usize>) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Set the check name.
    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.check = check.into();
        self
    }
}
