//! The data operations engine.
//!
//! Owns the current dataset and a bounded history of applied operations.
//! Undo and redo never restore stored snapshots: they replay the recorded
//! operations from the starting dataset up to the new cursor position.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, WranglerError};
use crate::inference::{infer_column_types, DEFAULT_SAMPLE_SIZE};
use crate::issues::{DataIssues, IssueDetector, QualityReport};
use crate::operations::{Operation, OperationKind};
use crate::value::{ColumnDescriptor, ColumnType, Dataset, Row};

use super::history::{
    HistoryEntry, OperationHistory, OperationRecord, ProcessFn, DEFAULT_HISTORY_LIMIT,
};

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of operations kept for undo/redo.
    pub history_limit: usize,
    /// Rows sampled per column when inferring types.
    pub type_sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            type_sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(WranglerError::Config(
                "history_limit must be at least 1".into(),
            ));
        }
        if self.type_sample_size == 0 {
            return Err(WranglerError::Config(
                "type_sample_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Applies operations to a dataset with linear undo/redo.
///
/// The visible state is `data` plus everything derived from it (columns,
/// column types, issues, quality). `data` always equals the starting dataset
/// with every history entry up to the cursor replayed in order. When the
/// history limit evicts the oldest entry, that entry is folded into the
/// starting dataset so the equality keeps holding. The original import is
/// kept separately for [`DataEngine::reset`].
#[derive(Debug, Clone)]
pub struct DataEngine {
    config: EngineConfig,
    original: Dataset,
    base: Dataset,
    data: Dataset,
    columns: Vec<String>,
    column_types: IndexMap<String, ColumnType>,
    issues: DataIssues,
    quality: QualityReport,
    history: OperationHistory,
    detector: IssueDetector,
}

impl DataEngine {
    /// Create an engine over an empty dataset.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Create an engine with custom settings.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let mut engine = Self {
            history: OperationHistory::new(config.history_limit),
            detector: IssueDetector::new().with_sample_size(config.type_sample_size),
            config,
            original: Dataset::empty(),
            base: Dataset::empty(),
            data: Dataset::empty(),
            columns: Vec::new(),
            column_types: IndexMap::new(),
            issues: DataIssues::default(),
            quality: QualityReport::default(),
        };
        engine.refresh();
        engine
    }

    /// Create an engine and load `data` as its original dataset.
    pub fn from_dataset(data: Dataset) -> Self {
        let mut engine = Self::new();
        engine.initialize_data(data);
        engine
    }

    /// Replace the dataset and start a fresh history.
    pub fn initialize_data(&mut self, data: Dataset) {
        info!(rows = data.len(), "initializing engine data");
        self.original = data.clone();
        self.base = data.clone();
        self.data = data;
        self.history.clear();
        self.refresh();
    }

    /// Load rows as the original dataset.
    pub fn initialize_rows(&mut self, rows: Vec<Row>) {
        self.initialize_data(Dataset::new(rows));
    }

    /// Apply an operation given as a process function.
    ///
    /// `process` runs against the current data. If it fails, the error is
    /// returned and the engine is left unchanged. On success the redo branch
    /// is discarded and a record is appended to the history.
    pub fn apply_operation<F>(
        &mut self,
        kind: OperationKind,
        name: &str,
        params: Value,
        process: F,
    ) -> Result<&OperationRecord>
    where
        F: Fn(&Dataset) -> Result<Dataset> + Send + Sync + 'static,
    {
        let process: ProcessFn = Arc::new(process);
        let new_data = process(&self.data)?;

        let new_base = match self.history.next_eviction() {
            Some(oldest) => Some(oldest.replay(&self.base)?),
            None => None,
        };

        debug!(
            operation = name,
            rows_before = self.data.len(),
            rows_after = new_data.len(),
            "applied operation"
        );

        let record = OperationRecord::new(kind, name, params);
        if let Some(evicted) = self.history.push(HistoryEntry::new(record, process)) {
            warn!(
                operation = %evicted.record.name,
                limit = self.history.limit(),
                "history limit reached, dropping oldest operation"
            );
        }
        if let Some(base) = new_base {
            self.base = base;
        }
        self.data = new_data;
        self.refresh();

        self.history
            .get(self.history.len() - 1)
            .ok_or_else(|| WranglerError::Config("history is empty after push".into()))
    }

    /// Apply a named [`Operation`].
    pub fn apply(&mut self, operation: Operation) -> Result<&OperationRecord> {
        let kind = operation.kind();
        let name = operation.name();
        let params = operation.params();
        self.apply_operation(kind, name, params, move |data| operation.apply(data))
    }

    /// Apply several operations in order, stopping at the first failure.
    /// Operations applied before the failure stay applied.
    pub fn apply_all<I>(&mut self, operations: I) -> Result<usize>
    where
        I: IntoIterator<Item = Operation>,
    {
        let mut applied = 0;
        for operation in operations {
            self.apply(operation)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Step back one operation. Returns false if there is nothing to undo.
    ///
    /// Only retained history can be undone. Operations evicted by the history
    /// limit stay applied, so undoing to the start may not equal
    /// [`DataEngine::original`]; use [`DataEngine::reset`] for that.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(target) = self.history.previous_cursor() else {
            return Ok(false);
        };
        let data = self.replay(target)?;
        self.history.step_back();
        self.data = data;
        self.refresh();
        Ok(true)
    }

    /// Re-apply the next operation. Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(target) = self.history.next_cursor() else {
            return Ok(false);
        };
        let data = self.replay(target)?;
        self.history.step_forward();
        self.data = data;
        self.refresh();
        Ok(true)
    }

    /// Restore the original dataset and clear the history.
    pub fn reset(&mut self) {
        info!(discarded = self.history.len(), "resetting to original data");
        self.base = self.original.clone();
        self.data = self.original.clone();
        self.history.clear();
        self.refresh();
    }

    fn replay(&self, cursor: Option<usize>) -> Result<Dataset> {
        let entries = self.history.applied_through(cursor);
        let mut data = self.base.clone();
        for entry in entries {
            data = entry.replay(&data)?;
            debug!(
                operation = %entry.record.name,
                rows = data.len(),
                "replayed operation"
            );
        }
        Ok(data)
    }

    fn refresh(&mut self) {
        self.columns = self.data.columns();
        self.column_types =
            infer_column_types(&self.data, &self.columns, self.config.type_sample_size);
        self.issues = self.detector.detect(&self.data);
        self.quality = QualityReport::from_issues(&self.data, &self.issues);
    }

    /// Current dataset.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Dataset as first loaded.
    pub fn original(&self) -> &Dataset {
        &self.original
    }

    /// Column names of the first row of the current dataset.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_types(&self) -> &IndexMap<String, ColumnType> {
        &self.column_types
    }

    pub fn column_descriptors(&self) -> Vec<ColumnDescriptor> {
        self.column_types
            .iter()
            .map(|(name, t)| ColumnDescriptor::new(name.clone(), *t))
            .collect()
    }

    pub fn issues(&self) -> &DataIssues {
        &self.issues
    }

    pub fn quality(&self) -> &QualityReport {
        &self.quality
    }

    pub fn history(&self) -> &OperationHistory {
        &self.history
    }

    /// Records in history order, including the redo branch.
    pub fn operation_history(&self) -> Vec<OperationRecord> {
        self.history.records().cloned().collect()
    }

    /// Index of the last applied operation, `None` if none is applied.
    pub fn current_operation_index(&self) -> Option<usize> {
        self.history.cursor()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for DataEngine {
    fn default() -> Self {
        Self::new()
    }
}
