//! Cell-by-cell cleaning that never adds or removes rows.

use tracing::debug;

use crate::inference::{CellClass, CellClassifier};
use crate::input::{CellValue, DataTable, Row};

/// Rewrites cells into canonical form using the cell classifier.
///
/// Numbers become typed numbers, dates become canonical date text, and
/// everything else (measurements, free text, blanks) is kept byte-for-byte.
/// Running the pipeline on its own output is a no-op.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleaningPipeline {
    classifier: CellClassifier,
}

impl CleaningPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: CellClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &CellClassifier {
        &self.classifier
    }

    /// Canonical form of a single cell.
    pub fn clean_cell(&self, value: &CellValue) -> CellValue {
        match self.classifier.classify(value) {
            CellClass::Number(n) => CellValue::Number(n),
            CellClass::Boolean(b) => CellValue::Bool(b),
            CellClass::Date(date) => CellValue::Text(self.classifier.format_date(date)),
            CellClass::Empty | CellClass::Measurement { .. } | CellClass::Text => value.clone(),
        }
    }

    /// Clean every cell of a table. Row count and columns are unchanged.
    pub fn clean_table(&self, table: &DataTable) -> DataTable {
        let mut rewritten = 0usize;

        let rows: Vec<Row> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(name, value)| {
                        let cleaned = self.clean_cell(value);
                        if &cleaned != value {
                            rewritten += 1;
                        }
                        (name.clone(), cleaned)
                    })
                    .collect()
            })
            .collect();

        debug!(rows = rows.len(), rewritten, "cleaned table");

        DataTable {
            columns: table.columns.clone(),
            rows,
        }
    }
}

/// Clean one cell with default settings.
pub fn clean_cell(value: &CellValue) -> CellValue {
    CleaningPipeline::new().clean_cell(value)
}

/// Clean a table with default settings.
pub fn clean_table(table: &DataTable) -> DataTable {
    CleaningPipeline::new().clean_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ClassifierConfig, DateStyle};

    fn sample() -> DataTable {
        DataTable::from_records(
            vec!["code".into(), "amount".into(), "when".into(), "price".into()],
            vec![
                vec!["007".into(), "123".into(), "30-06-2025".into(), "$5".into()],
                vec!["A1".into(), " 12.5 ".into(), "30-Jun-25".into(), "1,200".into()],
                vec![CellValue::Null, "".into(), "45000".into(), true.into()],
                vec!["2511/1122".into(), 7.into(), "   ".into(), "12 kg".into()],
            ],
        )
    }

    #[test]
    fn test_clean_cell_rules() {
        assert_eq!(clean_cell(&"123".into()), CellValue::Number(123.0));
        assert_eq!(clean_cell(&"007".into()), CellValue::text("007"));
        assert_eq!(clean_cell(&"30-06-2025".into()), CellValue::text("2025-06-30"));
        assert_eq!(clean_cell(&"30-Jun-25".into()), CellValue::text("2025-06-30"));
        assert_eq!(clean_cell(&"45000".into()), CellValue::text("2023-03-15"));
        assert_eq!(clean_cell(&"$5".into()), CellValue::text("$5"));
        assert_eq!(clean_cell(&"2511/1122".into()), CellValue::text("2511/1122"));
        assert_eq!(clean_cell(&"   ".into()), CellValue::text("   "));
        assert_eq!(clean_cell(&CellValue::Null), CellValue::Null);
        assert_eq!(clean_cell(&CellValue::Bool(false)), CellValue::Bool(false));
    }

    #[test]
    fn test_row_count_and_columns_unchanged() {
        let table = sample();
        let cleaned = clean_table(&table);
        assert_eq!(cleaned.row_count(), table.row_count());
        assert_eq!(cleaned.columns, table.columns);
    }

    #[test]
    fn test_idempotent() {
        let once = clean_table(&sample());
        let twice = clean_table(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_with_day_month_year_style() {
        let pipeline = CleaningPipeline::with_classifier(CellClassifier::with_config(
            ClassifierConfig {
                date_style: DateStyle::DayMonthYear,
                ..Default::default()
            },
        ));
        let once = pipeline.clean_table(&sample());
        assert_eq!(once.get(0, "when"), Some(&CellValue::text("30-06-2025")));
        assert_eq!(pipeline.clean_table(&once), once);
    }
}
