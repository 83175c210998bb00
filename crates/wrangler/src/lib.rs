//! Wrangler: in-memory tabular data cleaning and transformation.
//!
//! Wrangler loads a table of loosely-typed records, infers column types,
//! detects quality issues, proposes fixes, and applies named cleaning and
//! transformation operations with a bounded undo/redo history.
//!
//! # Core Principles
//!
//! - **Pure operations**: every step maps a dataset to a new dataset
//! - **Replayable history**: undo and redo re-run recorded operations
//! - **Non-destructive**: the imported data is kept for reset
//!
//! # Example
//!
//! ```
//! use wrangler::{ExportFormat, Wrangler};
//!
//! let mut wrangler = Wrangler::new();
//! wrangler.import_csv("name,age\n Ada ,36\n Ada ,36\nBob,\n").unwrap();
//!
//! let analysis = wrangler.analyze();
//! assert_eq!(analysis.issues.duplicate_rows, 1);
//!
//! for suggestion in &analysis.suggestions {
//!     println!("{} ({}%)", suggestion.title, suggestion.confidence);
//! }
//!
//! wrangler
//!     .apply_recipe(r#"[{"name": "removeDuplicates"}, {"name": "trimWhitespace"}]"#)
//!     .unwrap();
//! assert_eq!(wrangler.data().len(), 2);
//!
//! wrangler.undo().unwrap();
//! assert_eq!(wrangler.data().len(), 2);
//! assert!(wrangler.export(ExportFormat::Csv).unwrap().contains(" Ada "));
//! ```

pub mod engine;
pub mod error;
pub mod inference;
pub mod input;
pub mod issues;
pub mod operations;
pub mod suggestion;
pub mod value;

mod wrangler;

pub use crate::wrangler::{AnalysisResult, Wrangler, WranglerConfig};
pub use engine::{DataEngine, EngineConfig, OperationRecord, SharedEngine};
pub use error::{Result, WranglerError};
pub use inference::infer_type;
pub use input::{ExportFormat, Parser, ParserConfig, SourceMetadata};
pub use issues::{detect_issues, DataIssues, QualityReport};
pub use operations::{Operation, OperationKind};
pub use suggestion::{generate_suggestions, Suggestion, SuggestionGenerator, SuggestionTracker};
pub use value::{CellValue, ColumnDescriptor, ColumnType, Dataset, Row};
