//! Grouping and per-group aggregation.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::input::{CellValue, DataTable, Row};

use super::numeric::{clean_numeric, round2};
use super::request::{AggregatedRow, AggregationRequest, AggregationType};
use super::stats::MeasureStats;

/// Separator between dimension values in a group key.
pub const KEY_SEPARATOR: &str = " - ";

/// Groups rows and aggregates measures. Never fails on dirty input.
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine;

/// Contributions of one measure within one group.
struct MeasureBucket {
    stats: MeasureStats,
    /// Non-empty raw values, for counting aggregations.
    raw: Vec<CellValue>,
}

struct Group {
    key: String,
    dimensions: IndexMap<String, CellValue>,
    measures: Vec<MeasureBucket>,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate rows as described by the request. Groups come out in the
    /// order their key was first seen.
    pub fn aggregate(&self, rows: &[Row], request: &AggregationRequest) -> Vec<AggregatedRow> {
        let selected: Vec<&Row> = rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| is_selected(request, *idx))
            .map(|(_, row)| row)
            .collect();

        let aggregations: Vec<AggregationType> = request
            .measures
            .iter()
            .map(|m| request.aggregation_for(m))
            .collect();

        // Percentages are relative to the whole selection, not the group.
        let totals: Vec<f64> = request
            .measures
            .iter()
            .zip(&aggregations)
            .map(|(measure, aggregation)| match aggregation {
                AggregationType::Percentage => selected
                    .iter()
                    .map(|row| row.get(measure).map(clean_numeric).unwrap_or(0.0))
                    .sum::<f64>(),
                _ => 0.0,
            })
            .collect();

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for row in &selected {
            let key = group_key(row, &request.dimensions);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(Group {
                    dimensions: request
                        .dimensions
                        .iter()
                        .map(|d| (d.clone(), row.get(d).cloned().unwrap_or_default()))
                        .collect(),
                    key,
                    measures: request
                        .measures
                        .iter()
                        .map(|_| MeasureBucket {
                            stats: MeasureStats::new(),
                            raw: Vec::new(),
                        })
                        .collect(),
                });
                groups.len() - 1
            });

            let group = &mut groups[slot];
            for (bucket, measure) in group.measures.iter_mut().zip(&request.measures) {
                let Some(value) = row.get(measure).filter(|v| !v.is_empty()) else {
                    continue;
                };
                bucket.stats.add(clean_numeric(value));
                bucket.raw.push(value.clone());
            }
        }

        debug!(
            rows = rows.len(),
            selected = selected.len(),
            groups = groups.len(),
            measures = request.measures.len(),
            "aggregated rows"
        );

        groups
            .into_iter()
            .map(|group| {
                let values = request
                    .measures
                    .iter()
                    .zip(group.measures.iter())
                    .zip(aggregations.iter().zip(&totals))
                    .map(|((measure, bucket), (aggregation, total))| {
                        (measure.clone(), round2(reduce(bucket, *aggregation, *total)))
                    })
                    .collect();
                AggregatedRow {
                    key: group.key,
                    dimensions: group.dimensions,
                    values,
                }
            })
            .collect()
    }

    /// Aggregate a table's rows.
    pub fn aggregate_table(&self, table: &DataTable, request: &AggregationRequest) -> Vec<AggregatedRow> {
        self.aggregate(&table.rows, request)
    }
}

/// Aggregate rows with a default engine.
pub fn aggregate(rows: &[Row], request: &AggregationRequest) -> Vec<AggregatedRow> {
    AggregationEngine::new().aggregate(rows, request)
}

/// A row is dropped when any dimension has an allow-list without its index.
fn is_selected(request: &AggregationRequest, row_index: usize) -> bool {
    request.dimensions.iter().all(|dimension| {
        request
            .row_selections
            .get(dimension)
            .is_none_or(|allowed| allowed.contains(&row_index))
    })
}

/// Dimension display values joined by [`KEY_SEPARATOR`].
pub fn group_key(row: &Row, dimensions: &[String]) -> String {
    dimensions
        .iter()
        .map(|d| row.get(d).map(CellValue::display_string).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

fn reduce(bucket: &MeasureBucket, aggregation: AggregationType, total: f64) -> f64 {
    let stats = &bucket.stats;
    if stats.count() == 0 {
        return 0.0;
    }
    match aggregation {
        AggregationType::Sum => stats.sum(),
        AggregationType::Average => stats.mean(),
        AggregationType::Min => stats.min(),
        AggregationType::Max => stats.max(),
        AggregationType::Count => bucket.raw.len() as f64,
        AggregationType::DistinctCount => {
            let distinct: HashSet<String> = bucket.raw.iter().map(CellValue::fingerprint).collect();
            distinct.len() as f64
        }
        AggregationType::Median => stats.median(),
        AggregationType::Variance => stats.variance(),
        AggregationType::StdDev => stats.std_dev(),
        AggregationType::Percentage => {
            if total == 0.0 {
                0.0
            } else {
                stats.sum() / total * 100.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn regions() -> Vec<Row> {
        vec![
            row(&[("Region", "N".into()), ("Sales", 10.into())]),
            row(&[("Region", "N".into()), ("Sales", 20.into())]),
            row(&[("Region", "S".into()), ("Sales", 5.into())]),
        ]
    }

    fn sales(result: &[AggregatedRow]) -> Vec<f64> {
        result.iter().map(|r| r.value("Sales").unwrap_or(f64::NAN)).collect()
    }

    fn run(aggregation: AggregationType) -> Vec<AggregatedRow> {
        aggregate(
            &regions(),
            &AggregationRequest::new(["Region"], ["Sales"]).with_default(aggregation),
        )
    }

    #[test]
    fn test_sum_average_percentage() {
        let sum = run(AggregationType::Sum);
        assert_eq!(sum.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(), vec!["N", "S"]);
        assert_eq!(sales(&sum), vec![30.0, 5.0]);
        assert_eq!(sales(&run(AggregationType::Average)), vec![15.0, 5.0]);
        assert_eq!(sales(&run(AggregationType::Percentage)), vec![85.71, 14.29]);
    }

    #[test]
    fn test_other_aggregations() {
        assert_eq!(sales(&run(AggregationType::Min)), vec![10.0, 5.0]);
        assert_eq!(sales(&run(AggregationType::Max)), vec![20.0, 5.0]);
        assert_eq!(sales(&run(AggregationType::Count)), vec![2.0, 1.0]);
        assert_eq!(sales(&run(AggregationType::Median)), vec![15.0, 5.0]);
        assert_eq!(sales(&run(AggregationType::Variance)), vec![50.0, 0.0]);
        assert_eq!(sales(&run(AggregationType::StdDev)), vec![7.07, 0.0]);
    }

    #[test]
    fn test_first_seen_order_and_composite_keys() {
        let rows = vec![
            row(&[("a", "x".into()), ("b", 1.into()), ("v", 1.into())]),
            row(&[("a", "w".into()), ("b", 2.into()), ("v", 1.into())]),
            row(&[("a", "x".into()), ("b", 1.into()), ("v", 1.into())]),
            row(&[("a", "x".into()), ("b", CellValue::Null), ("v", 1.into())]),
        ];
        let result = aggregate(&rows, &AggregationRequest::new(["a", "b"], ["v"]));
        let keys: Vec<&str> = result.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["x - 1", "w - 2", "x - "]);
        assert_eq!(result[0].value("v"), Some(2.0));
        assert_eq!(result[0].dimensions["b"], CellValue::Number(1.0));
    }

    #[test]
    fn test_empty_cells_do_not_contribute() {
        let rows = vec![
            row(&[("g", "a".into()), ("v", 10.into())]),
            row(&[("g", "a".into()), ("v", CellValue::Null)]),
            row(&[("g", "a".into()), ("v", "".into())]),
            row(&[("g", "b".into()), ("v", CellValue::Null)]),
        ];
        let request = AggregationRequest::new(["g"], ["v"]).with_default(AggregationType::Average);
        let result = aggregate(&rows, &request);
        assert_eq!(result[0].value("v"), Some(10.0));
        assert_eq!(result[1].value("v"), Some(0.0));
    }

    #[test]
    fn test_counting_uses_raw_values() {
        let rows = vec![
            row(&[("g", "a".into()), ("name", "x".into())]),
            row(&[("g", "a".into()), ("name", "x".into())]),
            row(&[("g", "a".into()), ("name", "y".into())]),
            row(&[("g", "a".into()), ("name", CellValue::Null)]),
        ];
        let request = AggregationRequest::new(["g"], ["name"]).with_default(AggregationType::DistinctCount);
        assert_eq!(aggregate(&rows, &request)[0].value("name"), Some(2.0));

        let request = AggregationRequest::new(["g"], ["name"]).with_default(AggregationType::Count);
        assert_eq!(aggregate(&rows, &request)[0].value("name"), Some(3.0));
    }

    #[test]
    fn test_dirty_values_are_zero() {
        let rows = vec![
            row(&[("g", "a".into()), ("v", "$1,000".into())]),
            row(&[("g", "a".into()), ("v", "n/a".into())]),
            row(&[("g", "a".into()), ("v", "50%".into())]),
        ];
        let result = aggregate(&rows, &AggregationRequest::new(["g"], ["v"]));
        assert_eq!(result[0].value("v"), Some(1000.5));
    }

    #[test]
    fn test_row_selection_applies_before_percentage_totals() {
        let request = AggregationRequest::new(["Region"], ["Sales"])
            .with_default(AggregationType::Percentage)
            .with_row_selection("Region", vec![0, 2]);
        let result = aggregate(&regions(), &request);
        assert_eq!(sales(&result), vec![66.67, 33.33]);
    }

    #[test]
    fn test_zero_total_percentage() {
        let rows = vec![row(&[("g", "a".into()), ("v", 0.into())])];
        let request = AggregationRequest::new(["g"], ["v"]).with_default(AggregationType::Percentage);
        assert_eq!(aggregate(&rows, &request)[0].value("v"), Some(0.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], &AggregationRequest::new(["g"], ["v"])).is_empty());
    }
}
