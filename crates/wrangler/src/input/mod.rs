//! Import and export of tabular data.

mod export;
mod parser;
mod source;

pub use export::{export, export_to_path, to_csv, to_json, ExportFormat};
pub use parser::{coerce_csv_cell, parse_csv, parse_json, Parser, ParserConfig};
pub use source::{content_hash, SourceMetadata};
