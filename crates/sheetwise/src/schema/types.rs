//! Core type definitions for column classification.

use serde::{Deserialize, Serialize};

/// Inferred dominant type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Plain numbers.
    Numeric,
    /// Calendar dates.
    Date,
    /// Numbers carrying a unit or currency symbol.
    Measurement,
    /// Anything else. Also the fallback when no type wins the vote.
    #[default]
    Text,
}

impl ColumnType {
    /// Returns true if values of this column can be summed.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric | ColumnType::Measurement)
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Measurement => "measurement",
            ColumnType::Text => "text",
        }
    }
}
