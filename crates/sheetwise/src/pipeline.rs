//! Top-level ingestion pipeline: detect, clean, analyse.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cleaning::CleaningPipeline;
use crate::error::Result;
use crate::inference::{CellClassifier, ClassifierConfig, ColumnTypeDetector, DEFAULT_THRESHOLD};
use crate::input::{DataTable, Row};
use crate::schema::ColumnMetadata;
use crate::transform::{TransformationStep, apply_all_with};
use crate::validation::{QualityAnalyzer, QualityConfig, QualityReport};

/// Configuration for a [`Sheetwise`] pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetwiseConfig {
    /// Cell classification settings.
    pub classifier: ClassifierConfig,

    /// Share of non-empty cells a type must exceed to win a column.
    pub classification_threshold: f64,

    /// Quality thresholds and penalties.
    pub quality: QualityConfig,
}

impl Default for SheetwiseConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            classification_threshold: DEFAULT_THRESHOLD,
            quality: QualityConfig::default(),
        }
    }
}

impl SheetwiseConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every nested setting.
    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        self.quality.validate()?;
        ColumnTypeDetector::new().with_threshold(self.classification_threshold)?;
        Ok(())
    }
}

/// Result of ingesting one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    /// The cleaned table.
    pub table: DataTable,

    /// Column classification of the raw table.
    pub metadata: ColumnMetadata,

    /// Quality of the cleaned table.
    pub quality_report: QualityReport,

    /// Human-readable account of what the run did.
    pub log: Vec<String>,
}

/// Result of ingesting several named sheets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkbookResult {
    /// Per-sheet results in input order.
    pub sheets: IndexMap<String, IngestResult>,

    /// Per-sheet messages, in the same order.
    pub transformation_log: IndexMap<String, Vec<String>>,
}

impl WorkbookResult {
    pub fn sheet(&self, name: &str) -> Option<&IngestResult> {
        self.sheets.get(name)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Lowest quality score across sheets; 100 when there are none.
    pub fn min_score(&self) -> u32 {
        self.sheets
            .values()
            .map(|s| s.quality_report.score)
            .min()
            .unwrap_or(100)
    }
}

/// The ingestion pipeline.
pub struct Sheetwise {
    config: SheetwiseConfig,
    detector: ColumnTypeDetector,
    cleaner: CleaningPipeline,
    analyzer: QualityAnalyzer,
}

impl Sheetwise {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        let config = SheetwiseConfig::default();
        let classifier = CellClassifier::with_config(config.classifier.clone());
        Self {
            detector: ColumnTypeDetector::with_classifier(classifier.clone()),
            cleaner: CleaningPipeline::with_classifier(classifier),
            analyzer: QualityAnalyzer::with_config(&config.quality),
            config,
        }
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: SheetwiseConfig) -> Result<Self> {
        config.validate()?;
        let classifier = CellClassifier::with_config(config.classifier.clone());
        let detector = ColumnTypeDetector::with_classifier(classifier.clone())
            .with_threshold(config.classification_threshold)?;
        Ok(Self {
            detector,
            cleaner: CleaningPipeline::with_classifier(classifier),
            analyzer: QualityAnalyzer::with_config(&config.quality),
            config,
        })
    }

    pub fn config(&self) -> &SheetwiseConfig {
        &self.config
    }

    /// Classify the raw table's columns, clean every cell and score the
    /// cleaned table.
    pub fn ingest(&self, table: DataTable) -> IngestResult {
        let mut log = Vec::new();

        let metadata = self.detector.detect(&table);
        log.push(format!(
            "Detected {} numeric, {} date, {} measurement and {} text columns",
            metadata.numeric_columns.len(),
            metadata.date_columns.len(),
            metadata.measurement_columns.len(),
            metadata.text_columns.len()
        ));

        let cleaned = self.cleaner.clean_table(&table);
        let rewritten = count_changed(&table, &cleaned);
        log.push(format!("Normalized {} cells", rewritten));

        let quality_report = self.analyzer.analyze(&cleaned, &metadata);
        log.push(format!(
            "Quality score {} with {} issues",
            quality_report.score,
            quality_report.total_issues()
        ));

        info!(
            rows = cleaned.row_count(),
            columns = cleaned.column_count(),
            score = quality_report.score,
            issues = quality_report.total_issues(),
            "ingested table"
        );

        IngestResult {
            table: cleaned,
            metadata,
            quality_report,
            log,
        }
    }

    /// Ingest rows with an explicit column order.
    pub fn ingest_rows(&self, rows: Vec<Row>, columns: Vec<String>) -> IngestResult {
        self.ingest(DataTable::new(columns, rows))
    }

    /// Ingest each sheet independently.
    pub fn ingest_workbook(&self, sheets: IndexMap<String, DataTable>) -> WorkbookResult {
        let mut result = WorkbookResult::default();

        for (name, table) in sheets {
            debug!(sheet = %name, rows = table.row_count(), "ingesting sheet");
            let mut messages = vec![format!(
                "Sheet '{}': {} rows, {} columns",
                name,
                table.row_count(),
                table.column_count()
            )];
            let ingested = self.ingest(table);
            messages.extend(ingested.log.iter().cloned());

            result.transformation_log.insert(name.clone(), messages);
            result.sheets.insert(name, ingested);
        }

        info!(sheets = result.sheet_count(), "ingested workbook");
        result
    }

    /// Apply transformation steps, then re-detect and re-score the result.
    pub fn transform_and_analyze(&self, table: &DataTable, steps: &[TransformationStep]) -> IngestResult {
        let transformed = apply_all_with(table, steps, &self.cleaner);
        let metadata = self.detector.detect(&transformed);
        let quality_report = self.analyzer.analyze(&transformed, &metadata);

        let log = steps
            .iter()
            .map(|s| s.description().to_string())
            .chain(std::iter::once(format!(
                "Quality score {} with {} issues",
                quality_report.score,
                quality_report.total_issues()
            )))
            .collect();

        debug!(steps = steps.len(), score = quality_report.score, "re-analyzed transformed table");

        IngestResult {
            table: transformed,
            metadata,
            quality_report,
            log,
        }
    }
}

impl Default for Sheetwise {
    fn default() -> Self {
        Self::new()
    }
}

fn count_changed(before: &DataTable, after: &DataTable) -> usize {
    before
        .rows
        .iter()
        .zip(&after.rows)
        .map(|(a, b)| a.iter().filter(|(k, v)| b.get(*k) != Some(*v)).count())
        .sum()
}
