//! Column type definitions.

use serde::{Deserialize, Serialize};

/// Inferred data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Finite numeric values.
    Number,
    /// Boolean values or `true`/`false` text.
    Boolean,
    /// Timestamps or parseable date text.
    Date,
    /// Anything else.
    String,
    /// No non-empty sample to judge from.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Lowercase label, matching the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::String => "string",
            ColumnType::Unknown => "unknown",
        }
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number)
    }
}

/// A column name with its inferred type.
///
/// Always derived from the current dataset, never stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Inferred type from a sample of rows.
    pub inferred_type: ColumnType,
}

impl ColumnDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, inferred_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            inferred_type,
        }
    }
}
