//! Metadata about an imported data source.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata about the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path, or a label for in-memory input.
    pub file: String,
    /// Full path to the file, when imported from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// SHA-256 hash of the raw contents.
    pub hash: String,
    /// Size of the raw contents in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, json, ...).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the import happened.
    pub imported_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe raw `contents` that parsed into `row_count` × `column_count`.
    pub fn new(
        file: impl Into<String>,
        contents: &[u8],
        format: impl Into<String>,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            file: file.into(),
            path: None,
            hash: content_hash(contents),
            size_bytes: contents.len() as u64,
            format: format.into(),
            row_count,
            column_count,
            imported_at: Utc::now(),
        }
    }

    /// Attach the path the contents were read from.
    pub fn with_path(mut self, path: &Path) -> Self {
        if let Some(name) = path.file_name() {
            self.file = name.to_string_lossy().into_owned();
        }
        self.path = Some(path.to_path_buf());
        self
    }
}

/// `sha256:<hex>` digest of raw bytes.
pub fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("sha256:{:x}", hasher.finalize())
}

/// Format label for a CSV-family delimiter.
pub fn delimiter_format(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}
