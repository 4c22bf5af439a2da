//! Schema types describing what the detector learned about each column.

mod column;
mod table;
mod types;

pub use column::{ColumnCounts, ColumnVotes};
pub use table::ColumnMetadata;
pub use types::ColumnType;
