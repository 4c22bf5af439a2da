//! Quality analysis: checks, issues and the scored report.

mod analyzer;
mod checks;
mod issue;
mod report;

pub use analyzer::{QualityAnalyzer, QualityConfig};
pub use checks::{
    DuplicateRowCheck, InvalidDateCheck, MissingValueCheck, MixedTypeCheck, QualityCheck,
};
pub use issue::{IssueKind, QualityIssue, Severity};
pub use report::{ColumnStats, QualityReport};
