//! In-memory cell values and tables handed over by an external reader.

mod table;
mod value;

pub use table::{DataTable, Row};
pub use value::{CellValue, canonical_number};
