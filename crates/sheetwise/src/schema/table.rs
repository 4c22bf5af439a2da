//! Table-level classification metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::{ColumnCounts, ColumnVotes};
use super::types::ColumnType;

/// What the column type detector learned about a table.
///
/// The four name lists mirror the ingest contract consumed by renderers;
/// `column_types` holds the same information keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub measurement_columns: Vec<String>,
    /// Inferred type per column, in table order.
    pub column_types: IndexMap<String, ColumnType>,
    /// Raw vote tallies behind each classification.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub votes: IndexMap<String, ColumnVotes>,
    /// Empty/non-empty cell counts per column.
    #[serde(default)]
    pub column_counts: IndexMap<String, ColumnCounts>,
}

impl ColumnMetadata {
    /// Record the classification of one column.
    pub fn insert(&mut self, name: &str, column_type: ColumnType, votes: ColumnVotes) {
        let list = match column_type {
            ColumnType::Numeric => &mut self.numeric_columns,
            ColumnType::Date => &mut self.date_columns,
            ColumnType::Measurement => &mut self.measurement_columns,
            ColumnType::Text => &mut self.text_columns,
        };
        list.push(name.to_string());
        self.column_types.insert(name.to_string(), column_type);
        self.votes.insert(name.to_string(), votes);
    }

    /// Get the inferred type of a column. Unknown columns are text.
    pub fn column_type(&self, name: &str) -> ColumnType {
        self.column_types.get(name).copied().unwrap_or_default()
    }

    /// Columns whose values can be summed (numeric and measurement).
    pub fn numeric_like_columns(&self) -> impl Iterator<Item = &str> {
        self.column_types
            .iter()
            .filter(|(_, t)| t.is_numeric())
            .map(|(name, _)| name.as_str())
    }
}
