//! Transformation steps that can be applied to a table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SheetwiseError;

/// Target of a change-type step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Re-run the cell cleaner.
    Auto,
    WholeNumber,
    DecimalNumber,
    Text,
    Date,
    Boolean,
}

impl DataType {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Auto => "Default (Auto Detect)",
            DataType::WholeNumber => "Whole Number",
            DataType::DecimalNumber => "Decimal Number",
            DataType::Text => "Text",
            DataType::Date => "Date",
            DataType::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DataType {
    type Err = SheetwiseError;

    /// Accepts the label (`"Whole Number"`), the snake-case name
    /// (`"whole_number"`) or `"default"` for auto detection.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        let data_type = match normalized.as_str() {
            "auto" | "default" | "default_(auto_detect)" => DataType::Auto,
            "whole_number" | "integer" => DataType::WholeNumber,
            "decimal_number" | "decimal" => DataType::DecimalNumber,
            "text" => DataType::Text,
            "date" => DataType::Date,
            "boolean" => DataType::Boolean,
            _ => return Err(SheetwiseError::UnknownDataType(s.to_string())),
        };
        Ok(data_type)
    }
}

/// What a step does, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// Rename a column in the column list and every row.
    RenameColumn { from: String, to: String },

    /// Drop a column from the column list and every row.
    RemoveColumn { column: String },

    /// Drop rows by the indices they had when the step was created.
    RemoveRows { indices: Vec<usize> },

    /// Carry the last non-empty value down into empty cells.
    FillDown { column: String },

    /// Carry the next non-empty value up into empty cells.
    FillUp { column: String },

    /// Replace cells whose display text equals `find`.
    FindReplace {
        column: String,
        find: String,
        replace: String,
    },

    /// Convert every cell of a column.
    ChangeType { column: String, target: DataType },

    /// Add (or overwrite) a column computed from an expression such as
    /// `[Revenue] - [Cost]`.
    AddDerivedColumn { name: String, expression: String },

    /// Join several columns' display text into one column.
    MergeColumns {
        columns: Vec<String>,
        separator: String,
        name: String,
    },
}

impl StepKind {
    /// Get a human-readable description of the step.
    pub fn description(&self) -> String {
        match self {
            StepKind::RenameColumn { from, to } => format!("Renamed \"{}\" to \"{}\"", from, to),
            StepKind::RemoveColumn { column } => format!("Removed column \"{}\"", column),
            StepKind::RemoveRows { indices } => format!("Removed {} rows", indices.len()),
            StepKind::FillDown { column } => format!("Filled down column \"{}\"", column),
            StepKind::FillUp { column } => format!("Filled up column \"{}\"", column),
            StepKind::FindReplace {
                column,
                find,
                replace,
            } => format!("Replaced \"{}\" with \"{}\" in {}", find, replace, column),
            StepKind::ChangeType { column, target } => {
                format!("Changed \"{}\" to {}", column, target)
            }
            StepKind::AddDerivedColumn { name, .. } => format!("Added custom column \"{}\"", name),
            StepKind::MergeColumns { name, .. } => format!("Merged columns to \"{}\"", name),
        }
    }

    /// Short machine name of the step kind.
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::RenameColumn { .. } => "rename_column",
            StepKind::RemoveColumn { .. } => "remove_column",
            StepKind::RemoveRows { .. } => "remove_rows",
            StepKind::FillDown { .. } => "fill_down",
            StepKind::FillUp { .. } => "fill_up",
            StepKind::FindReplace { .. } => "find_replace",
            StepKind::ChangeType { .. } => "change_type",
            StepKind::AddDerivedColumn { .. } => "add_derived_column",
            StepKind::MergeColumns { .. } => "merge_columns",
        }
    }
}

/// One recorded transformation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationStep {
    id: String,
    kind: StepKind,
    description: String,
    created_at: DateTime<Utc>,
}

impl TransformationStep {
    /// Create a step with a fresh id and a generated description.
    pub fn new(kind: StepKind) -> Self {
        Self {
            id: generate_step_id(),
            description: kind.description(),
            kind,
            created_at: Utc::now(),
        }
    }

    /// Create a step with a caller-supplied description.
    pub fn with_description(kind: StepKind, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::new(kind)
        }
    }

    pub fn rename_column(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(StepKind::RenameColumn {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn remove_column(column: impl Into<String>) -> Self {
        Self::new(StepKind::RemoveColumn {
            column: column.into(),
        })
    }

    pub fn remove_rows(indices: Vec<usize>) -> Self {
        Self::new(StepKind::RemoveRows { indices })
    }

    pub fn fill_down(column: impl Into<String>) -> Self {
        Self::new(StepKind::FillDown {
            column: column.into(),
        })
    }

    pub fn fill_up(column: impl Into<String>) -> Self {
        Self::new(StepKind::FillUp {
            column: column.into(),
        })
    }

    pub fn find_replace(
        column: impl Into<String>,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self::new(StepKind::FindReplace {
            column: column.into(),
            find: find.into(),
            replace: replace.into(),
        })
    }

    pub fn change_type(column: impl Into<String>, target: DataType) -> Self {
        Self::new(StepKind::ChangeType {
            column: column.into(),
            target,
        })
    }

    pub fn add_derived_column(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::new(StepKind::AddDerivedColumn {
            name: name.into(),
            expression: expression.into(),
        })
    }

    pub fn merge_columns(
        columns: Vec<String>,
        separator: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(StepKind::MergeColumns {
            columns,
            separator: separator.into(),
            name: name.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Generate a unique step ID.
fn generate_step_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("step_{:03}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_ids_are_unique() {
        let a = TransformationStep::fill_down("x");
        let b = TransformationStep::fill_down("x");
        assert!(a.id().starts_with("step_"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            TransformationStep::rename_column("a", "b").description(),
            "Renamed \"a\" to \"b\""
        );
        assert_eq!(
            TransformationStep::remove_rows(vec![1, 4]).description(),
            "Removed 2 rows"
        );
        assert_eq!(
            TransformationStep::change_type("qty", DataType::WholeNumber).description(),
            "Changed \"qty\" to Whole Number"
        );
        let custom = TransformationStep::with_description(
            StepKind::FillUp { column: "x".into() },
            "Backfill x",
        );
        assert_eq!(custom.description(), "Backfill x");
    }

    #[test]
    fn test_data_type_from_str() {
        assert_eq!("Whole Number".parse::<DataType>().unwrap(), DataType::WholeNumber);
        assert_eq!("decimal_number".parse::<DataType>().unwrap(), DataType::DecimalNumber);
        assert_eq!("Default (Auto Detect)".parse::<DataType>().unwrap(), DataType::Auto);
        assert_eq!("default".parse::<DataType>().unwrap(), DataType::Auto);
        assert!(matches!(
            "currency".parse::<DataType>(),
            Err(SheetwiseError::UnknownDataType(_))
        ));
    }

    #[test]
    fn test_step_serialization() {
        let step = TransformationStep::find_replace("city", "NYC", "New York");
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"type\":\"FIND_REPLACE\""));
        let back: TransformationStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
