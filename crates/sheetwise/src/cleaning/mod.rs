//! Cleaning: rewrite cells into canonical typed form, plus explicit fix and
//! edit actions a caller can trigger after reading the quality report.

mod edits;
mod fix;
mod pipeline;

pub use edits::{
    convert_cell_to_text, convert_column_to_text, delete_column, delete_row, fill_empty_cell,
    fill_missing_in_column, fill_missing_in_row, fix_mixed_types_in_row, normalize_cell_date,
    normalize_column_dates, normalize_dates_in_row, replace_row, update_cell,
};
pub use fix::{FILL_VALUE, FixResult, fix_quality};
pub use pipeline::{CleaningPipeline, clean_cell, clean_table};
