//! Aggregation request and result types.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SheetwiseError;
use crate::input::{CellValue, Row};

/// How a measure is reduced within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    #[default]
    Sum,
    Average,
    Count,
    DistinctCount,
    Min,
    Max,
    StdDev,
    Variance,
    Median,
    Percentage,
}

impl AggregationType {
    pub const ALL: [AggregationType; 10] = [
        AggregationType::Sum,
        AggregationType::Average,
        AggregationType::Count,
        AggregationType::DistinctCount,
        AggregationType::Min,
        AggregationType::Max,
        AggregationType::StdDev,
        AggregationType::Variance,
        AggregationType::Median,
        AggregationType::Percentage,
    ];

    /// The upper-case wire name (`"DISTINCT_COUNT"`).
    pub fn name(&self) -> &'static str {
        match self {
            AggregationType::Sum => "SUM",
            AggregationType::Average => "AVERAGE",
            AggregationType::Count => "COUNT",
            AggregationType::DistinctCount => "DISTINCT_COUNT",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
            AggregationType::StdDev => "STD_DEV",
            AggregationType::Variance => "VARIANCE",
            AggregationType::Median => "MEDIAN",
            AggregationType::Percentage => "PERCENTAGE",
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AggregationType::Sum => "Sum",
            AggregationType::Average => "Average",
            AggregationType::Count => "Count",
            AggregationType::DistinctCount => "Count (Distinct)",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
            AggregationType::StdDev => "Standard deviation",
            AggregationType::Variance => "Variance",
            AggregationType::Median => "Median",
            AggregationType::Percentage => "Percentage (%)",
        }
    }

    /// Counting aggregations work on raw values; the rest coerce to numbers.
    pub fn is_counting(&self) -> bool {
        matches!(self, AggregationType::Count | AggregationType::DistinctCount)
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationType {
    type Err = SheetwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| SheetwiseError::UnknownAggregation(s.to_string()))
    }
}

/// What to group by and what to compute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationRequest {
    /// Grouping columns; their display values form the composite key.
    pub dimensions: Vec<String>,
    /// Columns aggregated within each group.
    pub measures: Vec<String>,
    /// Aggregation for measures without an override.
    pub default: AggregationType,
    /// Per-measure aggregation.
    pub overrides: IndexMap<String, AggregationType>,
    /// Dimension column to the row indices allowed to contribute.
    pub row_selections: IndexMap<String, Vec<usize>>,
}

impl AggregationRequest {
    /// Create a request that sums every measure.
    pub fn new<D, M>(dimensions: D, measures: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            measures: measures.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the default aggregation.
    pub fn with_default(mut self, aggregation: AggregationType) -> Self {
        self.default = aggregation;
        self
    }

    /// Override the aggregation for one measure.
    pub fn with_override(mut self, measure: impl Into<String>, aggregation: AggregationType) -> Self {
        self.overrides.insert(measure.into(), aggregation);
        self
    }

    /// Only let the given row indices contribute, keyed by dimension column.
    pub fn with_row_selection(mut self, dimension: impl Into<String>, rows: Vec<usize>) -> Self {
        self.row_selections.insert(dimension.into(), rows);
        self
    }

    /// The aggregation applied to a measure.
    pub fn aggregation_for(&self, measure: &str) -> AggregationType {
        self.overrides.get(measure).copied().unwrap_or(self.default)
    }
}

/// One output group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Dimension display values joined with `" - "`.
    pub key: String,
    /// Dimension values taken from the group's first row.
    pub dimensions: IndexMap<String, CellValue>,
    /// One value per measure, rounded to two decimals.
    pub values: IndexMap<String, f64>,
}

impl AggregatedRow {
    /// Value of one measure.
    pub fn value(&self, measure: &str) -> Option<f64> {
        self.values.get(measure).copied()
    }

    /// Flatten into a plain row: dimensions first, then measures.
    pub fn to_row(&self) -> Row {
        let mut row = self.dimensions.clone();
        for (measure, value) in &self.values {
            row.insert(measure.clone(), CellValue::Number(*value));
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("SUM".parse::<AggregationType>().unwrap(), AggregationType::Sum);
        assert_eq!("distinct_count".parse::<AggregationType>().unwrap(), AggregationType::DistinctCount);
        assert_eq!("Std Dev".parse::<AggregationType>().unwrap(), AggregationType::StdDev);
        assert!(matches!(
            "NONE".parse::<AggregationType>(),
            Err(SheetwiseError::UnknownAggregation(_))
        ));
        for t in AggregationType::ALL {
            assert_eq!(t.to_string().parse::<AggregationType>().unwrap(), t);
        }
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        let json = serde_json::to_string(&AggregationType::StdDev).unwrap();
        assert_eq!(json, "\"STD_DEV\"");
        let request: AggregationRequest = serde_json::from_str(
            r#"{"dimensions":["Region"],"measures":["Sales"],"overrides":{"Sales":"PERCENTAGE"}}"#,
        )
        .unwrap();
        assert_eq!(request.default, AggregationType::Sum);
        assert_eq!(request.aggregation_for("Sales"), AggregationType::Percentage);
    }

    #[test]
    fn test_default_is_sum() {
        let request = AggregationRequest::new(["Region"], ["Sales", "Units"])
            .with_override("Units", AggregationType::Count);
        assert_eq!(request.aggregation_for("Sales"), AggregationType::Sum);
        assert_eq!(request.aggregation_for("Units"), AggregationType::Count);
    }

    #[test]
    fn test_to_row() {
        let mut dimensions = IndexMap::new();
        dimensions.insert("Region".to_string(), CellValue::text("N"));
        let mut values = IndexMap::new();
        values.insert("Sales".to_string(), 30.0);
        let row = AggregatedRow {
            key: "N".into(),
            dimensions,
            values,
        }
        .to_row();
        assert_eq!(row.get("Region"), Some(&CellValue::text("N")));
        assert_eq!(row.get("Sales"), Some(&CellValue::Number(30.0)));
    }
}
