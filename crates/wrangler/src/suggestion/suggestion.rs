//! Suggestion types for proposed data fixes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::operations::Operation;

/// Broad category of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    /// Remove or repair bad values.
    Cleaning,
    /// Reshape or derive columns.
    Transformation,
    /// Normalize how values are written.
    Formatting,
    /// Fix values that break a column's type.
    Validation,
}

impl SuggestionType {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionType::Cleaning => "Cleaning",
            SuggestionType::Transformation => "Transformation",
            SuggestionType::Formatting => "Formatting",
            SuggestionType::Validation => "Validation",
        }
    }
}

/// Lifecycle of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    /// Not yet acted on.
    #[default]
    Pending,
    /// The operation was applied.
    Applied,
    /// Rejected by the user.
    Dismissed,
}

impl SuggestionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "Pending",
            SuggestionStatus::Applied => "Applied",
            SuggestionStatus::Dismissed => "Dismissed",
        }
    }

    /// Check if this is a terminal status (not pending).
    pub fn is_decided(&self) -> bool {
        !matches!(self, SuggestionStatus::Pending)
    }
}

/// The operation a suggestion proposes, as a loosely typed `{name, params}`
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedOperation {
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

impl SuggestedOperation {
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Resolve to a typed [`Operation`]. Unknown names fail with
    /// `UnknownOperation`.
    pub fn to_operation(&self) -> Result<Operation> {
        Operation::from_name_and_params(&self.name, &self.params)
    }
}

impl From<&Operation> for SuggestedOperation {
    fn from(operation: &Operation) -> Self {
        Self::new(operation.name(), operation.params())
    }
}

/// A proposed fix for an issue found in the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Identifier derived from the proposed operation, stable across runs.
    pub id: String,

    /// Category of the suggestion.
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,

    /// Short headline.
    pub title: String,

    /// Longer explanation shown to the user.
    pub description: String,

    /// Fixed heuristic confidence (0-100).
    pub confidence: u8,

    /// Operation to run if the suggestion is accepted.
    pub operation: SuggestedOperation,

    /// Current status.
    pub status: SuggestionStatus,

    /// Number of rows the issue touches, when known.
    pub affected_rows: usize,

    /// When this suggestion was generated.
    pub timestamp: DateTime<Utc>,
}

impl Suggestion {
    /// Create a pending suggestion for `operation`.
    pub fn new(
        suggestion_type: SuggestionType,
        title: impl Into<String>,
        operation: &Operation,
    ) -> Self {
        let operation = SuggestedOperation::from(operation);
        Self {
            id: suggestion_id(&operation),
            suggestion_type,
            title: title.into(),
            description: String::new(),
            confidence: 50,
            operation,
            status: SuggestionStatus::Pending,
            affected_rows: 0,
            timestamp: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set confidence, clamped to 100.
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(100);
        self
    }

    /// Set affected rows count.
    pub fn with_affected_rows(mut self, count: usize) -> Self {
        self.affected_rows = count;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }
}

/// `sug_` plus the first 8 hex digits of a SHA-256 over the operation name
/// and parameters.
fn suggestion_id(operation: &SuggestedOperation) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.name.as_bytes());
    hasher.update(b"\0");
    hasher.update(operation.params.to_string().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("sug_{}", &digest[..8])
}
