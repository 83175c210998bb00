//! Error types for the Wrangler library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Wrangler operations.
#[derive(Debug, Error)]
pub enum WranglerError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Empty file or no rows to work with.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An operation name that has no entry in the dispatch table.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Operation parameters that could not be decoded or are out of range.
    #[error("Invalid parameters for '{operation}': {message}")]
    InvalidParameters { operation: String, message: String },

    /// Formula parse or evaluation error.
    #[error("Formula error: {0}")]
    Formula(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WranglerError {
    /// Shorthand for an [`WranglerError::InvalidParameters`] error.
    pub fn invalid_params(operation: impl Into<String>, message: impl Into<String>) -> Self {
        WranglerError::InvalidParameters {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for Wrangler operations.
pub type Result<T> = std::result::Result<T, WranglerError>;
