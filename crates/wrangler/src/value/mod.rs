//! Core data model: cells, rows, datasets and column types.

mod cell;
mod dataset;
mod date;
mod types;

pub use cell::{format_number, is_boolean_literal, parse_number, CellValue};
pub use dataset::{row_fingerprint, Dataset, Row};
pub use date::{format_iso, parse_date};
pub use types::{ColumnDescriptor, ColumnType};
