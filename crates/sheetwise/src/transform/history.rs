//! Bounded undo history of table snapshots.

use std::collections::VecDeque;

use crate::input::DataTable;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Caller-owned snapshot stack. When full, the oldest snapshot is dropped.
#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: VecDeque<DataTable>,
    limit: usize,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Keep at most `limit` snapshots (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Save a snapshot of the table before an edit.
    pub fn push(&mut self, table: &DataTable) {
        if self.snapshots.len() == self.limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(table.clone());
    }

    /// Take back the most recent snapshot.
    pub fn undo(&mut self) -> Option<DataTable> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}
