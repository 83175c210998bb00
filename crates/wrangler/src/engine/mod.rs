//! Data operations engine with replay-based undo/redo.

#[allow(clippy::module_inception)]
mod engine;
mod history;
mod shared;

pub use engine::{DataEngine, EngineConfig};
pub use history::{OperationHistory, OperationRecord, DEFAULT_HISTORY_LIMIT};
pub use shared::SharedEngine;
