//! Targeted cell, row and column edits.
//!
//! Every function takes the table by reference and returns a new table.
//! Out-of-range row indices and unknown columns leave the table unchanged.

use crate::inference::{DateStyle, parse_strict_date};
use crate::input::{CellValue, DataTable, Row};

/// Clone the table and run `edit` on one row, if it exists.
fn edit_row(table: &DataTable, index: usize, edit: impl FnOnce(&mut Row)) -> DataTable {
    let mut out = table.clone();
    if let Some(row) = out.rows.get_mut(index) {
        edit(row);
    }
    out
}

/// Clone the table and run `edit` on one column of every row, if the
/// column exists.
fn edit_column(table: &DataTable, column: &str, mut edit: impl FnMut(&mut CellValue)) -> DataTable {
    let mut out = table.clone();
    if !out.has_column(column) {
        return out;
    }
    for row in &mut out.rows {
        if let Some(value) = row.get_mut(column) {
            edit(value);
        }
    }
    out
}

fn iso_date(value: &CellValue) -> Option<String> {
    parse_strict_date(value.as_str()?).map(|date| DateStyle::Iso.format(date))
}

fn to_text(value: &mut CellValue) {
    if !value.is_text() {
        *value = CellValue::Text(value.display_string());
    }
}

/// Set one cell.
pub fn update_cell(table: &DataTable, row: usize, column: &str, value: CellValue) -> DataTable {
    edit_row(table, row, |r| {
        if let Some(cell) = r.get_mut(column) {
            *cell = value;
        }
    })
}

/// Set one cell only if it is currently empty.
pub fn fill_empty_cell(table: &DataTable, row: usize, column: &str, fill: &str) -> DataTable {
    edit_row(table, row, |r| {
        if let Some(cell) = r.get_mut(column) {
            if cell.is_empty() {
                *cell = CellValue::text(fill);
            }
        }
    })
}

/// Remove one row.
pub fn delete_row(table: &DataTable, row: usize) -> DataTable {
    let mut out = table.clone();
    if row < out.rows.len() {
        out.rows.remove(row);
    }
    out
}

/// Replace a whole row. The replacement is normalized to the table's
/// columns.
pub fn replace_row(table: &DataTable, row: usize, replacement: Row) -> DataTable {
    let normalized: Row = table
        .columns
        .iter()
        .map(|name| (name.clone(), replacement.get(name).cloned().unwrap_or_default()))
        .collect();
    edit_row(table, row, |r| *r = normalized)
}

/// Fill every empty cell of one row.
pub fn fill_missing_in_row(table: &DataTable, row: usize, fill: &str) -> DataTable {
    edit_row(table, row, |r| {
        for cell in r.values_mut().filter(|c| c.is_empty()) {
            *cell = CellValue::text(fill);
        }
    })
}

/// Fill every empty cell of one column.
pub fn fill_missing_in_column(table: &DataTable, column: &str, fill: &str) -> DataTable {
    edit_column(table, column, |cell| {
        if cell.is_empty() {
            *cell = CellValue::text(fill);
        }
    })
}

/// Turn one cell into its display text.
pub fn convert_cell_to_text(table: &DataTable, row: usize, column: &str) -> DataTable {
    edit_row(table, row, |r| {
        if let Some(cell) = r.get_mut(column) {
            to_text(cell);
        }
    })
}

/// Turn every cell of a column into its display text. Nulls become `""`.
pub fn convert_column_to_text(table: &DataTable, column: &str) -> DataTable {
    edit_column(table, column, to_text)
}

/// Rewrite one cell as an ISO date when it is a strictly valid date.
pub fn normalize_cell_date(table: &DataTable, row: usize, column: &str) -> DataTable {
    edit_row(table, row, |r| {
        if let Some(cell) = r.get_mut(column) {
            if let Some(iso) = iso_date(cell) {
                *cell = CellValue::Text(iso);
            }
        }
    })
}

/// Rewrite every strictly valid date of a column as ISO.
pub fn normalize_column_dates(table: &DataTable, column: &str) -> DataTable {
    edit_column(table, column, |cell| {
        if let Some(iso) = iso_date(cell) {
            *cell = CellValue::Text(iso);
        }
    })
}

/// Rewrite every date-like cell (containing `/` or `-`) of one row as ISO.
pub fn normalize_dates_in_row(table: &DataTable, row: usize) -> DataTable {
    edit_row(table, row, |r| {
        for cell in r.values_mut() {
            let date_like = cell.as_str().is_some_and(|s| s.contains('/') || s.contains('-'));
            if !date_like {
                continue;
            }
            if let Some(iso) = iso_date(cell) {
                *cell = CellValue::Text(iso);
            }
        }
    })
}

/// Remove a column from the column list and every row.
pub fn delete_column(table: &DataTable, column: &str) -> DataTable {
    let mut out = table.clone();
    if !out.has_column(column) {
        return out;
    }
    out.columns.retain(|c| c != column);
    for row in &mut out.rows {
        row.shift_remove(column);
    }
    out
}

/// Turn every cell of one row into display text.
pub fn fix_mixed_types_in_row(table: &DataTable, row: usize) -> DataTable {
    edit_row(table, row, |r| r.values_mut().for_each(to_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::from_records(
            vec!["name".into(), "qty".into(), "when".into()],
            vec![
                vec!["a".into(), 1.into(), "30/06/2025".into()],
                vec![CellValue::Null, 2.into(), "".into()],
                vec!["c".into(), CellValue::Null, "01-07-2025".into()],
            ],
        )
    }

    #[test]
    fn test_edits_do_not_touch_input() {
        let table = sample();
        let edited = update_cell(&table, 0, "name", "z".into());
        assert_eq!(edited.get(0, "name"), Some(&CellValue::text("z")));
        assert_eq!(table.get(0, "name"), Some(&CellValue::text("a")));
    }

    #[test]
    fn test_out_of_range_and_unknown_are_noops() {
        let table = sample();
        assert_eq!(update_cell(&table, 9, "name", "z".into()), table);
        assert_eq!(update_cell(&table, 0, "nope", "z".into()), table);
        assert_eq!(delete_row(&table, 9), table);
        assert_eq!(delete_column(&table, "nope"), table);
        assert_eq!(fill_missing_in_column(&table, "nope", "-"), table);
    }

    #[test]
    fn test_fill_helpers() {
        let table = sample();
        let filled = fill_empty_cell(&table, 1, "name", "?");
        assert_eq!(filled.get(1, "name"), Some(&CellValue::text("?")));
        let kept = fill_empty_cell(&table, 0, "name", "?");
        assert_eq!(kept.get(0, "name"), Some(&CellValue::text("a")));

        let row_filled = fill_missing_in_row(&table, 1, "-");
        assert_eq!(row_filled.get(1, "when"), Some(&CellValue::text("-")));

        let col_filled = fill_missing_in_column(&table, "qty", "0");
        assert_eq!(col_filled.get(2, "qty"), Some(&CellValue::text("0")));
    }

    #[test]
    fn test_row_helpers() {
        let table = sample();
        assert_eq!(delete_row(&table, 0).row_count(), 2);

        let mut replacement = Row::new();
        replacement.insert("qty".into(), 9.into());
        replacement.insert("extra".into(), "x".into());
        let replaced = replace_row(&table, 0, replacement);
        assert_eq!(replaced.get(0, "qty"), Some(&CellValue::Number(9.0)));
        assert_eq!(replaced.get(0, "name"), Some(&CellValue::Null));
        assert_eq!(replaced.get(0, "extra"), None);

        let texted = fix_mixed_types_in_row(&table, 2);
        assert_eq!(texted.get(2, "qty"), Some(&CellValue::text("")));
        assert_eq!(texted.get(2, "name"), Some(&CellValue::text("c")));
    }

    #[test]
    fn test_text_conversion() {
        let table = sample();
        let one = convert_cell_to_text(&table, 0, "qty");
        assert_eq!(one.get(0, "qty"), Some(&CellValue::text("1")));
        assert_eq!(one.get(1, "qty"), Some(&CellValue::Number(2.0)));

        let all = convert_column_to_text(&table, "qty");
        assert_eq!(all.get(1, "qty"), Some(&CellValue::text("2")));
        assert_eq!(all.get(2, "qty"), Some(&CellValue::text("")));
    }

    #[test]
    fn test_date_normalization() {
        let table = sample();
        let one = normalize_cell_date(&table, 0, "when");
        assert_eq!(one.get(0, "when"), Some(&CellValue::text("2025-06-30")));
        assert_eq!(one.get(2, "when"), Some(&CellValue::text("01-07-2025")));

        let column = normalize_column_dates(&table, "when");
        assert_eq!(column.get(2, "when"), Some(&CellValue::text("2025-07-01")));
        assert_eq!(column.get(1, "when"), Some(&CellValue::text("")));

        let row = normalize_dates_in_row(&table, 2);
        assert_eq!(row.get(2, "when"), Some(&CellValue::text("2025-07-01")));
    }

    #[test]
    fn test_delete_column() {
        let table = delete_column(&sample(), "qty");
        assert_eq!(table.columns, vec!["name", "when"]);
        assert!(table.rows.iter().all(|r| !r.contains_key("qty")));
    }
}
