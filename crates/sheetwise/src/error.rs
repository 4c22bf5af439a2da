//! Error types for the Sheetwise library.
//!
//! Ingestion, cleaning, quality analysis and aggregation never fail: dirty
//! input degrades to text or zero. The variants here cover the few edges
//! where a caller hands us something we cannot interpret at all.

use thiserror::Error;

/// Main error type for Sheetwise operations.
#[derive(Debug, Error)]
pub enum SheetwiseError {
    /// A derived-column expression could not be tokenized or parsed.
    #[error("Expression error at position {position}: {message}")]
    Expression { position: usize, message: String },

    /// A step id that is not part of the step log.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// An aggregation name that is not recognised.
    #[error("Unknown aggregation type: {0}")]
    UnknownAggregation(String),

    /// A change-type target that is not recognised.
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Sheetwise operations.
pub type Result<T> = std::result::Result<T, SheetwiseError>;
