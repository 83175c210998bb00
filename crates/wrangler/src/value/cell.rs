//! Cell values held in dataset rows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::date::{format_iso, parse_date};
use super::types::ColumnType;

/// Largest integer magnitude that survives an f64 round trip.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A single cell in a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value (always finite when produced by this crate).
    Number(f64),
    /// Text value.
    String(String),
    /// Timestamp value.
    Date(DateTime<Utc>),
}

impl CellValue {
    /// Create a string cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::String(value.into())
    }

    /// Returns true for null and for the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns true if this is a null cell.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Borrow the text of a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce the cell to a finite number.
    ///
    /// Numbers pass through, booleans map to 1/0, dates to epoch milliseconds
    /// and strings are parsed after trimming. Empty and non-numeric text
    /// yields `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Number(n) => n.is_finite().then_some(*n),
            CellValue::String(s) => parse_number(s),
            CellValue::Date(d) => Some(d.timestamp_millis() as f64),
        }
    }

    /// Numeric value of number cells and numeric text, ignoring booleans and dates.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => n.is_finite().then_some(*n),
            CellValue::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Interpret the cell as a timestamp.
    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_date(s),
            _ => None,
        }
    }

    /// Classify this single value, refining text that looks like a number,
    /// boolean or date.
    pub fn refined_type(&self) -> ColumnType {
        match self {
            CellValue::Null => ColumnType::Unknown,
            CellValue::Bool(_) => ColumnType::Boolean,
            CellValue::Number(_) => ColumnType::Number,
            CellValue::Date(_) => ColumnType::Date,
            CellValue::String(s) => {
                if parse_number(s).is_some() {
                    ColumnType::Number
                } else if is_boolean_literal(s) {
                    ColumnType::Boolean
                } else if s.len() > 5 && parse_date(s).is_some() {
                    ColumnType::Date
                } else {
                    ColumnType::String
                }
            }
        }
    }

    /// Convert to a JSON value. Dates become ISO-8601 strings.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Number(n) => number_to_json(*n),
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Date(d) => Value::String(format_iso(d)),
        }
    }

    /// Build a cell from a JSON value. Arrays and objects are kept as their
    /// JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(CellValue::Number)
                .unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::String(s.clone()),
            other => CellValue::String(other.to_string()),
        }
    }
}

/// Parse text as a finite number, tolerating surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns true for `true`/`false` in any letter case.
pub fn is_boolean_literal(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}

/// Render a number the way a spreadsheet user expects: integers without a
/// trailing `.0`, and no negative zero.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::String(s) => f.write_str(s),
            CellValue::Date(d) => f.write_str(&format_iso(d)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(CellValue::from_json(&value))
    }
}
