//! Grouping and aggregation into chart-ready series.

mod engine;
mod numeric;
mod order;
mod request;
mod stats;

pub use engine::{AggregationEngine, KEY_SEPARATOR, aggregate, group_key};
pub use numeric::{clean_numeric, clean_numeric_str, round2};
pub use order::{DEFAULT_DOWNSAMPLE_CAP, SortDirection, SortKey, downsample, sort_rows};
pub use request::{AggregatedRow, AggregationRequest, AggregationType};
pub use stats::MeasureStats;
