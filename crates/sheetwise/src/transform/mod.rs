//! Transformation steps, their replayable log and edit history.

mod engine;
pub mod expression;
mod history;
mod log;
mod operations;

pub use engine::{apply_all, apply_all_with, apply_kind, apply_step, apply_step_with, convert};
pub use history::{DEFAULT_HISTORY_LIMIT, EditHistory};
pub use log::StepLog;
pub use operations::{DataType, StepKind, TransformationStep};
