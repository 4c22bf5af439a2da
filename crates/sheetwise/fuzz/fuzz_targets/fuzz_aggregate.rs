//! Fuzz target for grouping and aggregation.
//!
//! Every line becomes a row of tab-separated cells; the first column is the
//! dimension and the second the measure. Aggregation must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sheetwise::{AggregationRequest, AggregationType, CellValue, DataTable, aggregate};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let records = content
            .lines()
            .map(|l| l.split('\t').map(CellValue::text).collect())
            .collect();
        let table = DataTable::from_records(vec!["dim".to_string(), "measure".to_string()], records);

        for aggregation in AggregationType::ALL {
            let request = AggregationRequest::new(["dim"], ["measure"]).with_default(aggregation);
            let _ = aggregate(&table.rows, &request);
        }
    }
});
