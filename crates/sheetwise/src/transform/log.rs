//! Ordered, replayable log of transformation steps.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SheetwiseError};
use crate::input::DataTable;

use crate::cleaning::CleaningPipeline;

use super::engine::{apply_all_with, apply_step_with};
use super::operations::TransformationStep;

/// Owns the original table and the steps applied to it.
///
/// `current()` always equals `apply_all_with(original, steps, cleaner)`:
/// pushing applies the new step to the current table, removing a step
/// replays the rest from the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    original: DataTable,
    steps: Vec<TransformationStep>,
    #[serde(skip)]
    current: DataTable,
    #[serde(skip)]
    cleaner: CleaningPipeline,
}

impl StepLog {
    /// Start a log over an original table.
    pub fn new(original: DataTable) -> Self {
        Self {
            current: original.clone(),
            original,
            steps: Vec::new(),
            cleaner: CleaningPipeline::new(),
        }
    }

    /// Re-clean with `cleaner` on type changes, and replay with it.
    pub fn with_cleaner(mut self, cleaner: CleaningPipeline) -> Self {
        self.cleaner = cleaner;
        self.replay();
        self
    }

    pub fn original(&self) -> &DataTable {
        &self.original
    }

    /// The table with every step applied.
    pub fn current(&self) -> &DataTable {
        &self.current
    }

    pub fn steps(&self) -> &[TransformationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply a step to the current table and record it.
    pub fn push(&mut self, step: TransformationStep) -> &DataTable {
        self.current = apply_step_with(&self.current, &step, &self.cleaner);
        debug!(step = step.id(), total = self.steps.len() + 1, "recorded step");
        self.steps.push(step);
        &self.current
    }

    /// Remove a step by id and rebuild from the original.
    pub fn remove(&mut self, id: &str) -> Result<TransformationStep> {
        let index = self
            .steps
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| SheetwiseError::UnknownStep(id.to_string()))?;
        let removed = self.steps.remove(index);
        self.replay();
        info!(step = id, remaining = self.steps.len(), "removed step");
        Ok(removed)
    }

    /// Drop the most recent step, if any.
    pub fn undo(&mut self) -> Option<TransformationStep> {
        let removed = self.steps.pop()?;
        self.replay();
        Some(removed)
    }

    /// Rebuild the current table from the original and every step.
    pub fn replay(&mut self) -> &DataTable {
        self.current = apply_all_with(&self.original, &self.steps, &self.cleaner);
        &self.current
    }

    /// Export the original table and steps as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import a log exported with [`StepLog::to_json`] and replay it.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut log: StepLog = serde_json::from_str(json)?;
        log.replay();
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CellValue;
    use crate::transform::apply_all;
    use crate::transform::DataType;

    fn original() -> DataTable {
        DataTable::from_records(
            vec!["name".into(), "qty".into()],
            vec![
                vec!["a".into(), "1".into()],
                vec![CellValue::Null, "2".into()],
                vec!["c".into(), "x".into()],
            ],
        )
    }

    fn steps() -> Vec<TransformationStep> {
        vec![
            TransformationStep::fill_down("name"),
            TransformationStep::change_type("qty", DataType::WholeNumber),
            TransformationStep::add_derived_column("double", "[qty] * 2"),
            TransformationStep::rename_column("name", "label"),
        ]
    }

    #[test]
    fn test_incremental_equals_replay() {
        let mut log = StepLog::new(original());
        for step in steps() {
            log.push(step);
        }
        let incremental = log.current().clone();
        assert_eq!(incremental, apply_all(&original(), log.steps()));
        assert_eq!(log.replay(), &incremental);
    }

    #[test]
    fn test_remove_step_rebuilds_from_original() {
        let mut log = StepLog::new(original());
        let all = steps();
        let fill_id = all[0].id().to_string();
        for step in all {
            log.push(step);
        }

        let removed = log.remove(&fill_id).unwrap();
        assert_eq!(removed.id(), fill_id);
        assert_eq!(log.len(), 3);
        assert_eq!(log.current().get(1, "label"), Some(&CellValue::Null));
        assert_eq!(log.current(), &apply_all(log.original(), log.steps()));
    }

    #[test]
    fn test_remove_unknown_step() {
        let mut log = StepLog::new(original());
        assert!(matches!(log.remove("step_missing"), Err(SheetwiseError::UnknownStep(_))));
    }

    #[test]
    fn test_undo() {
        let mut log = StepLog::new(original());
        log.push(TransformationStep::remove_column("qty"));
        assert!(log.undo().is_some());
        assert_eq!(log.current(), log.original());
        assert!(log.undo().is_none());
    }

    #[test]
    fn test_cleaner_applies_to_push_and_replay() {
        use crate::inference::{CellClassifier, ClassifierConfig, DateStyle};

        let cleaner = CleaningPipeline::with_classifier(CellClassifier::with_config(ClassifierConfig {
            date_style: DateStyle::DayMonthYear,
            ..Default::default()
        }));
        let table = DataTable::from_records(vec!["d".into()], vec![vec!["2025-06-30".into()]]);
        let mut log = StepLog::new(table).with_cleaner(cleaner);

        log.push(TransformationStep::change_type("d", DataType::Date));
        assert_eq!(log.current().get(0, "d"), Some(&CellValue::text("30-06-2025")));
        log.replay();
        assert_eq!(log.current().get(0, "d"), Some(&CellValue::text("30-06-2025")));
    }

    #[test]
    fn test_json_round_trip_replays() {
        let mut log = StepLog::new(original());
        for step in steps() {
            log.push(step);
        }
        let json = log.to_json().unwrap();
        let restored = StepLog::from_json(&json).unwrap();
        assert_eq!(restored.current(), log.current());
        assert_eq!(restored.steps(), log.steps());
    }
}
