//! Cleaning and transformation operations.
//!
//! The free functions in [`cleaning`] and [`transform`] are pure
//! `&Dataset -> Dataset` steps. [`Operation`] names each of them so they can
//! be recorded, replayed and decoded from JSON.

pub mod cleaning;
pub mod formula;
mod operation;
pub mod transform;

pub use cleaning::{FillMethod, TextCase};
pub use formula::Formula;
pub use operation::{parse_recipe, Operation, OperationKind, DEFAULT_OUTLIER_MULTIPLIER};
pub use transform::{Filter, FilterOperator, RoundConfig, SortDirection, SortKey};
