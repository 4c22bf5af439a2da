//! Sheetwise: an ingestion core for messy spreadsheet data.
//!
//! Raw cells come in as strings, numbers, booleans or nulls. Sheetwise decides
//! what each column holds, normalizes the cells, scores the table's quality,
//! and offers a replayable log of transformations plus grouped aggregation.
//!
//! # Core Principles
//!
//! - **Never fail on data**: dirty cells degrade to text or zero
//! - **Non-destructive**: every operation returns a new table
//! - **Replayable**: transformations are data and can be re-applied to the original
//!
//! # Example
//!
//! ```
//! use sheetwise::{AggregationRequest, AggregationType, DataTable, Sheetwise};
//!
//! let table = DataTable::from_records(
//!     vec!["Region".into(), "Sales".into()],
//!     vec![
//!         vec!["N".into(), "10".into()],
//!         vec!["N".into(), "20".into()],
//!         vec!["S".into(), "5".into()],
//!     ],
//! );
//!
//! let result = Sheetwise::new().ingest(table);
//! assert_eq!(result.metadata.numeric_columns, vec!["Sales"]);
//! assert_eq!(result.quality_report.score, 100);
//!
//! let request = AggregationRequest::new(["Region"], ["Sales"])
//!     .with_default(AggregationType::Average);
//! let groups = sheetwise::aggregate(&result.table.rows, &request);
//! assert_eq!(groups[0].value("Sales"), Some(15.0));
//! ```

pub mod aggregate;
pub mod cleaning;
pub mod error;
pub mod inference;
pub mod input;
pub mod schema;
pub mod transform;
pub mod validation;

mod pipeline;

pub use crate::pipeline::{IngestResult, Sheetwise, SheetwiseConfig, WorkbookResult};
pub use aggregate::{AggregatedRow, AggregationEngine, AggregationRequest, AggregationType, aggregate};
pub use cleaning::{CleaningPipeline, clean_table, fix_quality};
pub use error::{Result, SheetwiseError};
pub use inference::{CellClass, CellClassifier, ColumnTypeDetector, classify};
pub use input::{CellValue, DataTable, Row};
pub use schema::{ColumnMetadata, ColumnType};
pub use transform::{DataType, StepKind, StepLog, TransformationStep, apply_all, apply_step};
pub use validation::{IssueKind, QualityAnalyzer, QualityIssue, QualityReport, Severity};
