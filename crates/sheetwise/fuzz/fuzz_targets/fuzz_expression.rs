//! Fuzz target for derived-column expressions.
//!
//! This fuzzer tests that the expression parser and evaluator never panic,
//! and that failures surface as errors or null cells.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sheetwise::transform::expression;
use sheetwise::{CellValue, Row};

fuzz_target!(|data: &[u8]| {
    if data.len() > 4_096 {
        return;
    }

    if let Ok(source) = std::str::from_utf8(data) {
        let row: Row = [
            ("a".to_string(), CellValue::Number(2.0)),
            ("b".to_string(), CellValue::text("x")),
            ("c".to_string(), CellValue::Null),
        ]
        .into_iter()
        .collect();

        if let Ok(expr) = expression::parse(source) {
            let _ = expr.evaluate(&row);
        }
        let _ = expression::evaluate(source, &row);
    }
});
