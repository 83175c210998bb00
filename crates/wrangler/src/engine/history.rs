//! Operation records and the bounded undo/redo history.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::operations::OperationKind;
use crate::value::Dataset;

/// Default number of operations kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// An applied operation. Records intent, not a data diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Unique identifier for this record.
    pub id: String,
    /// Clean or transform.
    #[serde(rename = "type")]
    pub kind: OperationKind,
    /// Operation name, e.g. `removeDuplicates`.
    pub name: String,
    /// Parameters the operation was applied with.
    pub params: Value,
    /// When the operation was applied.
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    pub fn new(kind: OperationKind, name: impl Into<String>, params: Value) -> Self {
        Self {
            id: generate_operation_id(),
            kind,
            name: name.into(),
            params,
            timestamp: Utc::now(),
        }
    }
}

fn generate_operation_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("op_{:03}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Function that produces the next dataset from the current one.
pub type ProcessFn = Arc<dyn Fn(&Dataset) -> Result<Dataset> + Send + Sync>;

/// A record plus the function that replays it.
#[derive(Clone)]
pub struct HistoryEntry {
    pub record: OperationRecord,
    process: ProcessFn,
}

impl HistoryEntry {
    pub fn new(record: OperationRecord, process: ProcessFn) -> Self {
        Self { record, process }
    }

    /// Re-run the operation against `data`.
    pub fn replay(&self, data: &Dataset) -> Result<Dataset> {
        (self.process)(data)
    }
}

impl fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Linear history with a cursor.
///
/// The cursor is the index of the last applied entry, `None` when nothing is
/// applied. Entries after the cursor are the redo branch.
#[derive(Debug, Clone)]
pub struct OperationHistory {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    limit: usize,
}

impl OperationHistory {
    /// `limit` is clamped to at least 1.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Index of the last applied entry.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(i) => i + 1 < self.entries.len(),
            None => !self.entries.is_empty(),
        }
    }

    /// All records, including the redo branch.
    pub fn records(&self) -> impl Iterator<Item = &OperationRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn get(&self, index: usize) -> Option<&OperationRecord> {
        self.entries.get(index).map(|e| &e.record)
    }

    /// Entries up to and including `cursor`.
    pub fn applied_through(&self, cursor: Option<usize>) -> &[HistoryEntry] {
        match cursor {
            Some(i) => &self.entries[..(i + 1).min(self.entries.len())],
            None => &[],
        }
    }

    /// The entry that would be evicted if one more entry were pushed after
    /// discarding the redo branch.
    pub fn next_eviction(&self) -> Option<&HistoryEntry> {
        let retained = self.cursor.map_or(0, |i| i + 1);
        if retained >= self.limit {
            self.entries.first()
        } else {
            None
        }
    }

    /// Drop the redo branch, append `entry` and move the cursor to it.
    ///
    /// Returns the oldest entry if the limit forced it out.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        let retained = self.cursor.map_or(0, |i| i + 1);
        self.entries.truncate(retained);
        self.entries.push(entry);

        let evicted = if self.entries.len() > self.limit {
            Some(self.entries.remove(0))
        } else {
            None
        };
        self.cursor = Some(self.entries.len() - 1);
        evicted
    }

    /// Move the cursor back one step. Returns false at the start.
    pub fn step_back(&mut self) -> bool {
        match self.cursor {
            Some(0) => {
                self.cursor = None;
                true
            }
            Some(i) => {
                self.cursor = Some(i - 1);
                true
            }
            None => false,
        }
    }

    /// Move the cursor forward one step. Returns false at the end.
    pub fn step_forward(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor = Some(self.cursor.map_or(0, |i| i + 1));
        true
    }

    /// Cursor one step back, without moving.
    pub fn previous_cursor(&self) -> Option<Option<usize>> {
        match self.cursor {
            Some(0) => Some(None),
            Some(i) => Some(Some(i - 1)),
            None => None,
        }
    }

    /// Cursor one step forward, without moving.
    pub fn next_cursor(&self) -> Option<Option<usize>> {
        if self.can_redo() {
            Some(Some(self.cursor.map_or(0, |i| i + 1)))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

impl Default for OperationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
