//! Fuzz target for cell classification and column detection.
//!
//! This fuzzer tests that the classifier:
//! 1. Never panics on any input values
//! 2. Only reports numbers whose canonical form is the input
//! 3. Cleaning the same column twice changes nothing

#![no_main]

use libfuzzer_sys::fuzz_target;
use sheetwise::input::canonical_number;
use sheetwise::{CellClass, CellValue, DataTable, classify, clean_table};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        if let CellClass::Number(n) = classify(&CellValue::text(content)) {
            assert_eq!(canonical_number(n), content.trim());
        }

        // One column, one cell per line
        let records = content.lines().map(|l| vec![CellValue::text(l)]).collect();
        let table = DataTable::from_records(vec!["col1".to_string()], records);
        let once = clean_table(&table);
        assert_eq!(clean_table(&once), once);
    }
});
