//! Table representation shared by every stage of the pipeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::CellValue;

/// A row: column name to cell value. Key order carries no meaning.
pub type Row = IndexMap<String, CellValue>;

/// Represents tabular data loaded by an external reader.
///
/// Every row holds exactly the declared columns; missing data is a `Null`
/// cell, never an absent key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataTable {
    /// Column names, in display order.
    pub columns: Vec<String>,
    /// Row data.
    pub rows: Vec<Row>,
}

impl DataTable {
    /// Create a table, normalizing every row to the declared columns.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| normalize_row(&columns, row))
            .collect();
        Self { columns, rows }
    }

    /// Create a table from positional records. Short records are padded
    /// with nulls; extra values are dropped.
    pub fn from_records(columns: Vec<String>, records: Vec<Vec<CellValue>>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| {
                let mut values = record.into_iter();
                columns
                    .iter()
                    .map(|name| (name.clone(), values.next().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Infer columns from the first row's keys (the raw reader contract
    /// when no header list is given).
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        Self::new(columns, rows)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get all values for a column by name. Rows lacking the key yield `Null`.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        static NULL: CellValue = CellValue::Null;
        self.rows.iter().map(move |row| row.get(name).unwrap_or(&NULL))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Structural identity of a row across the declared columns, used for
    /// duplicate detection.
    pub fn row_fingerprint(&self, row: &Row) -> String {
        let mut key = String::new();
        for column in &self.columns {
            key.push_str(&row.get(column).unwrap_or(&CellValue::Null).fingerprint());
            key.push('\u{1}');
        }
        key
    }
}

fn normalize_row(columns: &[String], mut row: Row) -> Row {
    columns
        .iter()
        .map(|name| {
            let value = row.swap_remove(name).unwrap_or_default();
            (name.clone(), value)
        })
        .collect()
}
