//! Type inference for cells and columns.

mod classifier;
mod dates;
mod detector;

pub use classifier::{
    CellClass, CellClassifier, ClassifierConfig, classify, parse_measurement, parse_strict_number,
};
pub use dates::{DateStyle, is_number_pair, parse_serial_date, parse_strict_date, to_serial};
pub use detector::{ColumnTypeDetector, DEFAULT_THRESHOLD, count_cells};
