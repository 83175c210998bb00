//! Type inference and numeric statistics over dataset columns.

mod statistics;
mod type_inference;

pub use statistics::{iqr_bounds, mean, median, mode, numeric_values, quartiles, round_to};
pub use type_inference::{describe_columns, infer_column_types, infer_type, DEFAULT_SAMPLE_SIZE};
