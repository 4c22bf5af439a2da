//! Applies transformation steps to tables.
//!
//! Every function here is pure: the input table is never mutated and an
//! invalid parameter (unknown column, rename collision) yields an unchanged
//! copy rather than an error.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::cleaning::{CleaningPipeline, delete_column};
use crate::inference::parse_strict_date;
use crate::input::{CellValue, DataTable, Row};

use super::expression::DerivedColumn;
use super::operations::{DataType, StepKind, TransformationStep};

/// Leading integer as read by a lenient spreadsheet parser (`"12abc"` → 12).
static INTEGER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[+-]?[0-9]+").unwrap());

/// Leading decimal literal (`"3.5kg"` → 3.5, `"1e3x"` → 1000).
static DECIMAL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
});

/// Apply one step, returning a new table.
pub fn apply_step(table: &DataTable, step: &TransformationStep) -> DataTable {
    apply_step_with(table, step, &CleaningPipeline::new())
}

/// Apply one step, re-cleaning cells with `cleaner` where the step needs it.
pub fn apply_step_with(
    table: &DataTable,
    step: &TransformationStep,
    cleaner: &CleaningPipeline,
) -> DataTable {
    debug!(step = step.id(), kind = step.kind().name(), "applying step");
    apply_kind(table, step.kind(), cleaner)
}

/// Apply steps in order, starting from `table`.
pub fn apply_all(table: &DataTable, steps: &[TransformationStep]) -> DataTable {
    apply_all_with(table, steps, &CleaningPipeline::new())
}

/// Apply steps in order with a configured cleaner.
pub fn apply_all_with(
    table: &DataTable,
    steps: &[TransformationStep],
    cleaner: &CleaningPipeline,
) -> DataTable {
    steps
        .iter()
        .fold(table.clone(), |current, step| apply_step_with(&current, step, cleaner))
}

/// Apply a step kind directly, without a recorded step.
pub fn apply_kind(table: &DataTable, kind: &StepKind, cleaner: &CleaningPipeline) -> DataTable {
    match kind {
        StepKind::RenameColumn { from, to } => rename_column(table, from, to),
        StepKind::RemoveColumn { column } => remove_column(table, column),
        StepKind::RemoveRows { indices } => remove_rows(table, indices),
        StepKind::FillDown { column } => fill(table, column, false),
        StepKind::FillUp { column } => fill(table, column, true),
        StepKind::FindReplace {
            column,
            find,
            replace,
        } => find_replace(table, column, find, replace),
        StepKind::ChangeType { column, target } => change_type(table, column, *target, cleaner),
        StepKind::AddDerivedColumn { name, expression } => {
            add_derived_column(table, name, expression)
        }
        StepKind::MergeColumns {
            columns,
            separator,
            name,
        } => merge_columns(table, columns, separator, name),
    }
}

fn rename_column(table: &DataTable, from: &str, to: &str) -> DataTable {
    if from == to || !table.has_column(from) || table.has_column(to) {
        debug!(from, to, "rename skipped");
        return table.clone();
    }

    let columns = table
        .columns
        .iter()
        .map(|c| if c == from { to.to_string() } else { c.clone() })
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| {
                    let key = if k == from { to.to_string() } else { k.clone() };
                    (key, v.clone())
                })
                .collect()
        })
        .collect();

    DataTable { columns, rows }
}

fn remove_column(table: &DataTable, column: &str) -> DataTable {
    if !table.has_column(column) {
        debug!(column, "remove column skipped: unknown column");
    }
    delete_column(table, column)
}

fn remove_rows(table: &DataTable, indices: &[usize]) -> DataTable {
    let drop: HashSet<usize> = indices.iter().copied().collect();
    let rows = table
        .rows
        .iter()
        .enumerate()
        .filter(|(idx, _)| !drop.contains(idx))
        .map(|(_, row)| row.clone())
        .collect();
    DataTable {
        columns: table.columns.clone(),
        rows,
    }
}

/// Carry the last non-empty value into empty cells, walking down or up.
fn fill(table: &DataTable, column: &str, upward: bool) -> DataTable {
    let mut out = table.clone();
    if !out.has_column(column) {
        debug!(column, "fill skipped: unknown column");
        return out;
    }

    let mut last: Option<CellValue> = None;
    let mut visit = |row: &mut Row| {
        if let Some(cell) = row.get_mut(column) {
            if !cell.is_empty() {
                last = Some(cell.clone());
            } else if let Some(value) = &last {
                *cell = value.clone();
            }
        }
    };

    if upward {
        out.rows.iter_mut().rev().for_each(&mut visit);
    } else {
        out.rows.iter_mut().for_each(&mut visit);
    }
    out
}

fn find_replace(table: &DataTable, column: &str, find: &str, replace: &str) -> DataTable {
    let mut out = table.clone();
    let mut replaced = 0usize;
    for row in &mut out.rows {
        if let Some(cell) = row.get_mut(column) {
            if cell.display_string() == find {
                *cell = CellValue::text(replace);
                replaced += 1;
            }
        }
    }
    debug!(column, replaced, "find and replace");
    out
}

fn change_type(
    table: &DataTable,
    column: &str,
    target: DataType,
    cleaner: &CleaningPipeline,
) -> DataTable {
    let mut out = table.clone();
    if !out.has_column(column) {
        debug!(column, "change type skipped: unknown column");
        return out;
    }

    for row in &mut out.rows {
        if let Some(cell) = row.get_mut(column) {
            *cell = convert(cell, target, cleaner);
        }
    }
    out
}

/// Convert one cell to a target type.
pub fn convert(value: &CellValue, target: DataType, cleaner: &CleaningPipeline) -> CellValue {
    match target {
        DataType::Auto => cleaner.clean_cell(value),
        DataType::WholeNumber => CellValue::Number(leading_integer(value)),
        DataType::DecimalNumber => CellValue::Number(leading_decimal(value)),
        DataType::Text => CellValue::Text(value.display_string()),
        DataType::Date => value
            .as_str()
            .and_then(parse_strict_date)
            .map(|date| CellValue::Text(cleaner.classifier().format_date(date)))
            .unwrap_or_else(|| value.clone()),
        DataType::Boolean => {
            let truthy = match value {
                CellValue::Number(n) => *n == 1.0,
                CellValue::Bool(b) => *b,
                other => other.display_string().eq_ignore_ascii_case("true"),
            };
            CellValue::Bool(truthy)
        }
    }
}

fn leading_integer(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => n.trunc(),
        other => numeric_prefix(&other.display_string(), &INTEGER_PREFIX),
    }
}

fn leading_decimal(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        other => numeric_prefix(&other.display_string(), &DECIMAL_PREFIX),
    }
}

/// Parse the numeric prefix of some text; 0 when there is none.
fn numeric_prefix(text: &str, pattern: &Regex) -> f64 {
    pattern
        .find(text)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn add_derived_column(table: &DataTable, name: &str, expression: &str) -> DataTable {
    let derived = DerivedColumn::compile(expression);
    if derived == DerivedColumn::Invalid {
        debug!(name, expression, "derived column expression does not parse");
    }

    let mut out = table.clone();
    for row in &mut out.rows {
        let value = derived.evaluate(row);
        row.insert(name.to_string(), value);
    }
    if !out.has_column(name) {
        out.columns.push(name.to_string());
    }
    out
}

fn merge_columns(table: &DataTable, columns: &[String], separator: &str, name: &str) -> DataTable {
    let mut out = table.clone();
    for row in &mut out.rows {
        let merged = columns
            .iter()
            .map(|c| row.get(c).map(CellValue::display_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(separator);
        row.insert(name.to_string(), CellValue::Text(merged));
    }
    if !out.has_column(name) {
        out.columns.push(name.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::from_records(
            vec!["region".into(), "sales".into(), "note".into()],
            vec![
                vec!["N".into(), 10.into(), "12.7kg".into()],
                vec![CellValue::Null, 20.into(), "abc".into()],
                vec!["S".into(), CellValue::Null, "true".into()],
                vec![CellValue::Null, 5.into(), "2025/06/30".into()],
            ],
        )
    }

    #[test]
    fn test_input_is_not_mutated() {
        let table = sample();
        let before = table.clone();
        let _ = apply_step(&table, &TransformationStep::remove_column("sales"));
        assert_eq!(table, before);
    }

    #[test]
    fn test_rename_column() {
        let out = apply_step(&sample(), &TransformationStep::rename_column("sales", "revenue"));
        assert_eq!(out.columns, vec!["region", "revenue", "note"]);
        assert_eq!(out.get(0, "revenue"), Some(&CellValue::Number(10.0)));
        assert_eq!(out.get(0, "sales"), None);
    }

    #[test]
    fn test_invalid_renames_are_noops() {
        let table = sample();
        assert_eq!(apply_step(&table, &TransformationStep::rename_column("nope", "x")), table);
        assert_eq!(apply_step(&table, &TransformationStep::rename_column("sales", "note")), table);
        assert_eq!(apply_step(&table, &TransformationStep::remove_column("nope")), table);
    }

    #[test]
    fn test_remove_rows() {
        let out = apply_step(&sample(), &TransformationStep::remove_rows(vec![0, 2, 99]));
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get(0, "sales"), Some(&CellValue::Number(20.0)));
    }

    #[test]
    fn test_fill_down_and_up() {
        let down = apply_step(&sample(), &TransformationStep::fill_down("region"));
        let regions: Vec<CellValue> = down.column_values("region").cloned().collect();
        let expected: Vec<CellValue> = vec!["N".into(), "N".into(), "S".into(), "S".into()];
        assert_eq!(regions, expected);

        let up = apply_step(&sample(), &TransformationStep::fill_up("region"));
        let regions: Vec<CellValue> = up.column_values("region").cloned().collect();
        let expected: Vec<CellValue> = vec!["N".into(), "S".into(), "S".into(), CellValue::Null];
        assert_eq!(regions, expected);
    }

    #[test]
    fn test_fill_keeps_leading_gap() {
        let table = DataTable::from_records(
            vec!["a".into()],
            vec![vec![CellValue::Null], vec!["x".into()], vec![CellValue::Null]],
        );
        let down = apply_step(&table, &TransformationStep::fill_down("a"));
        assert_eq!(down.get(0, "a"), Some(&CellValue::Null));
        assert_eq!(down.get(2, "a"), Some(&CellValue::text("x")));
    }

    #[test]
    fn test_find_replace_matches_display_text() {
        let out = apply_step(&sample(), &TransformationStep::find_replace("sales", "10", "ten"));
        assert_eq!(out.get(0, "sales"), Some(&CellValue::text("ten")));
        assert_eq!(out.get(1, "sales"), Some(&CellValue::Number(20.0)));
    }

    #[test]
    fn test_change_type() {
        let table = sample();
        let whole = apply_step(&table, &TransformationStep::change_type("note", DataType::WholeNumber));
        let values: Vec<CellValue> = whole.column_values("note").cloned().collect();
        let expected: Vec<CellValue> = vec![12.into(), 0.into(), 0.into(), 2025.into()];
        assert_eq!(values, expected);

        let decimal = apply_step(&table, &TransformationStep::change_type("note", DataType::DecimalNumber));
        assert_eq!(decimal.get(0, "note"), Some(&CellValue::Number(12.7)));

        let text = apply_step(&table, &TransformationStep::change_type("sales", DataType::Text));
        assert_eq!(text.get(0, "sales"), Some(&CellValue::text("10")));
        assert_eq!(text.get(2, "sales"), Some(&CellValue::text("")));

        let date = apply_step(&table, &TransformationStep::change_type("note", DataType::Date));
        assert_eq!(date.get(3, "note"), Some(&CellValue::text("2025-06-30")));
        assert_eq!(date.get(1, "note"), Some(&CellValue::text("abc")));

        let boolean = apply_step(&table, &TransformationStep::change_type("note", DataType::Boolean));
        assert_eq!(boolean.get(2, "note"), Some(&CellValue::Bool(true)));
        assert_eq!(boolean.get(1, "note"), Some(&CellValue::Bool(false)));

        let auto = apply_step(
            &DataTable::from_records(vec!["v".into()], vec![vec!["42".into()]]),
            &TransformationStep::change_type("v", DataType::Auto),
        );
        assert_eq!(auto.get(0, "v"), Some(&CellValue::Number(42.0)));
    }

    #[test]
    fn test_change_type_uses_configured_date_style() {
        use crate::inference::{CellClassifier, ClassifierConfig, DateStyle};

        let cleaner = CleaningPipeline::with_classifier(CellClassifier::with_config(ClassifierConfig {
            date_style: DateStyle::DayMonthYear,
            ..Default::default()
        }));
        let table = DataTable::from_records(
            vec!["d".into()],
            vec![vec!["2025/06/30".into()], vec!["30-Jun-25".into()]],
        );

        let step = TransformationStep::change_type("d", DataType::Date);
        let out = apply_step_with(&table, &step, &cleaner);
        assert_eq!(out.get(0, "d"), Some(&CellValue::text("30-06-2025")));
        assert_eq!(out.get(1, "d"), Some(&CellValue::text("30-06-2025")));

        let auto = apply_all_with(&table, &[TransformationStep::change_type("d", DataType::Auto)], &cleaner);
        assert_eq!(auto.get(0, "d"), Some(&CellValue::text("30-06-2025")));

        // The default cleaner writes ISO.
        assert_eq!(apply_step(&table, &step).get(0, "d"), Some(&CellValue::text("2025-06-30")));
    }

    #[test]
    fn test_whole_number_truncates_typed_numbers() {
        let table = DataTable::from_records(vec!["v".into()], vec![vec![12.9.into()], vec![1.into()]]);
        let out = apply_step(&table, &TransformationStep::change_type("v", DataType::WholeNumber));
        assert_eq!(out.get(0, "v"), Some(&CellValue::Number(12.0)));
        let out = apply_step(&table, &TransformationStep::change_type("v", DataType::Boolean));
        assert_eq!(out.get(1, "v"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_add_derived_column() {
        let out = apply_step(&sample(), &TransformationStep::add_derived_column("double", "[sales] * 2"));
        assert_eq!(out.columns.last().map(String::as_str), Some("double"));
        assert_eq!(out.get(0, "double"), Some(&CellValue::Number(20.0)));
        assert_eq!(out.get(2, "double"), Some(&CellValue::Number(0.0)));

        let overwritten = apply_step(&out, &TransformationStep::add_derived_column("double", "[sales] * 3"));
        assert_eq!(overwritten.column_count(), out.column_count());
        assert_eq!(overwritten.get(0, "double"), Some(&CellValue::Number(30.0)));

        let label = apply_step(&sample(), &TransformationStep::add_derived_column("tag", "Q1"));
        assert!(label.column_values("tag").all(|v| v == &CellValue::text("Q1")));
    }

    #[test]
    fn test_merge_columns() {
        let out = apply_step(
            &sample(),
            &TransformationStep::merge_columns(vec!["region".into(), "sales".into()], "-", "key"),
        );
        assert_eq!(out.get(0, "key"), Some(&CellValue::text("N-10")));
        assert_eq!(out.get(1, "key"), Some(&CellValue::text("-20")));
        assert_eq!(out.get(2, "key"), Some(&CellValue::text("S-")));
    }

    #[test]
    fn test_apply_all_folds_in_order() {
        let steps = vec![
            TransformationStep::fill_down("region"),
            TransformationStep::rename_column("region", "area"),
            TransformationStep::remove_rows(vec![0]),
        ];
        let out = apply_all(&sample(), &steps);
        assert_eq!(out.columns, vec!["area", "sales", "note"]);
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.get(0, "area"), Some(&CellValue::text("N")));
    }
}
