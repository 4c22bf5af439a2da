//! Example: Ingest a table, fix it up, transform it and aggregate it.
//!
//! Usage:
//!   cargo run --example ingest -- [table.json]
//!
//! The optional file holds `{ "columns": [...], "rows": [{...}, ...] }`.
//! Without it a small built-in sales sheet is used. Set `RUST_LOG=debug`
//! to see every pipeline stage.

use std::env;
use std::error::Error;
use std::fs;

use sheetwise::{
    AggregationRequest, AggregationType, CellValue, DataTable, DataType, Sheetwise, StepLog,
    TransformationStep, aggregate, fix_quality,
};
use tracing_subscriber::EnvFilter;

fn sample_table() -> DataTable {
    let records = [
        ["North", "ann", "1200", "30-06-2025", "12 kg"],
        ["North", "bob", "800", "30-Jun-25", "8 kg"],
        ["South", "ann", "$450", "2025-07-01", ""],
        ["South", "cid", "n/a", "45839", "5 kg"],
        ["North", "ann", "1200", "30-06-2025", "12 kg"],
        ["East", "", "300.5", "01/07/2025", "3 kg"],
    ];
    DataTable::from_records(
        ["Region", "Rep", "Sales", "Date", "Weight"]
            .into_iter()
            .map(String::from)
            .collect(),
        records
            .iter()
            .map(|r| r.iter().map(|v| CellValue::text(*v)).collect())
            .collect(),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let table = match env::args().nth(1) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str::<DataTable>(&content)?
        }
        None => sample_table(),
    };

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Sheetwise Ingest: {} rows, {} columns", table.row_count(), table.column_count());
    println!("{}", separator);
    println!();

    let sheetwise = Sheetwise::new();
    let result = sheetwise.ingest(table.clone());

    println!("## Columns");
    for (name, column_type) in &result.metadata.column_types {
        let counts = &result.metadata.column_counts[name];
        println!(
            "  {:20} {:12} non_empty={:<5} empty={}",
            name,
            column_type.label(),
            counts.non_empty,
            counts.empty
        );
    }
    println!();

    println!("## Quality (score {})", result.quality_report.score);
    for issue in &result.quality_report.issues {
        println!(
            "  [{}] {} (-{})",
            issue.severity.label(),
            issue.description,
            issue.penalty
        );
        if !issue.suggestion.is_empty() {
            println!("       {}", issue.suggestion);
        }
    }
    println!();

    let fixed = fix_quality(&result.table);
    println!("## Fixes");
    for fix in &fixed.fixes {
        println!("  - {}", fix);
    }
    println!();

    let mut log = StepLog::new(fixed.table);
    if log.original().has_column("Sales") {
        log.push(TransformationStep::change_type("Sales", DataType::DecimalNumber));
        log.push(TransformationStep::add_derived_column("Sales (k)", "[Sales] / 1000"));
    }
    println!("## Steps");
    for step in log.steps() {
        println!("  {} {}", step.id(), step.description());
    }
    println!();

    let dimension = log.current().columns.first().cloned();
    let measures: Vec<String> = result
        .metadata
        .numeric_like_columns()
        .filter(|c| log.current().has_column(c))
        .map(String::from)
        .collect();

    if let (Some(dimension), false) = (dimension, measures.is_empty()) {
        let request = AggregationRequest::new([dimension.clone()], measures.clone())
            .with_default(AggregationType::Sum);
        println!("## {} by {}", AggregationType::Sum.label(), dimension);
        for group in aggregate(&log.current().rows, &request) {
            let values: Vec<String> = group
                .values
                .iter()
                .map(|(m, v)| format!("{}={}", m, v))
                .collect();
            println!("  {:20} {}", group.key, values.join("  "));
        }
        println!();
    }

    println!("{}", separator);

    Ok(())
}
