//! A cloneable handle for sharing one engine between callers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::operations::Operation;
use crate::value::Dataset;

use super::engine::DataEngine;

/// Shared access to a [`DataEngine`].
///
/// Every call takes the lock for its whole duration, so overlapping callers
/// are serialized: each apply, undo, redo or reset runs to completion before
/// the next one starts.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<DataEngine>>,
}

impl SharedEngine {
    pub fn new(engine: DataEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine. A poisoned lock is recovered, since every engine call
    /// either commits fully or leaves the state untouched.
    pub fn lock(&self) -> MutexGuard<'_, DataEngine> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut DataEngine) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn apply(&self, operation: Operation) -> Result<()> {
        self.lock().apply(operation).map(|_| ())
    }

    pub fn undo(&self) -> Result<bool> {
        self.lock().undo()
    }

    pub fn redo(&self) -> Result<bool> {
        self.lock().redo()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn initialize_data(&self, data: Dataset) {
        self.lock().initialize_data(data);
    }

    /// Copy of the current dataset.
    pub fn snapshot(&self) -> Dataset {
        self.lock().data().clone()
    }

    pub fn can_undo(&self) -> bool {
        self.lock().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock().can_redo()
    }
}

impl From<DataEngine> for SharedEngine {
    fn from(engine: DataEngine) -> Self {
        Self::new(engine)
    }
}
