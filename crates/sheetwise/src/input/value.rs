//! A single raw or cleaned cell value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value held by a table cell.
///
/// Serializes untagged, so a row round-trips through JSON as a plain object
/// (`{"Region": "N", "Sales": 10, "Active": true, "Note": null}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value.
    #[default]
    Null,
    /// A typed boolean.
    Bool(bool),
    /// A typed number.
    Number(f64),
    /// Raw or cleaned text.
    Text(String),
}

impl CellValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Null or the empty string. Whitespace-only text is *not* empty here;
    /// the classifier treats it as blank but the table keeps it verbatim.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Null, empty, or whitespace-only.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the number if this is a typed number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }

    /// String form used for grouping keys, find/replace and merging.
    pub fn display_string(&self) -> String {
        self.to_string()
    }

    /// Type-tagged key so `Number(1)` and `Text("1")` stay distinct when
    /// hashing rows or counting distinct values.
    pub fn fingerprint(&self) -> String {
        match self {
            CellValue::Null => "\u{0}null".to_string(),
            CellValue::Bool(b) => format!("\u{0}b:{}", b),
            CellValue::Number(n) => format!("\u{0}n:{}", canonical_number(*n)),
            CellValue::Text(s) => format!("\u{0}t:{}", s),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => f.write_str(&canonical_number(*n)),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Canonical string form of a number: shortest round-trip decimal, no
/// exponent, and negative zero written as `0`.
///
/// Very small or very large magnitudes are written out in full
/// (`0.0000001`, `100000000000000000000000`). Formatters that switch to
/// exponent notation for those would not round-trip them, so such text
/// classifies as a number here but not there.
pub fn canonical_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}
