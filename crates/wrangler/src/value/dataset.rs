//! Row-oriented datasets.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cell::CellValue;

/// A row maps column names to cell values, preserving column order.
pub type Row = IndexMap<String, CellValue>;

/// An ordered sequence of rows.
///
/// Rows are expected to share one set of column names, but this is not
/// enforced; operations that add or remove columns touch every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset from rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Create an empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Take ownership of the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Column names of the first row, or empty if there are no rows.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Union of column names across all rows, in first-seen order.
    pub fn all_columns(&self) -> Vec<String> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for row in &self.rows {
            for key in row.keys() {
                seen.insert(key.as_str());
            }
        }
        seen.into_iter().map(String::from).collect()
    }

    /// Returns true if any row has the column.
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    /// Values of a column, with `Null` for rows lacking it.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&CellValue::Null))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Build a dataset from a JSON array of objects.
    pub fn from_json_rows(values: &[Value]) -> Option<Self> {
        values
            .iter()
            .map(|value| {
                value.as_object().map(|obj| {
                    obj.iter()
                        .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
                        .collect::<Row>()
                })
            })
            .collect::<Option<Vec<Row>>>()
            .map(Self::new)
    }
}

/// Serialize a row to canonical JSON text, used to detect repeated rows.
pub fn row_fingerprint(row: &Row) -> String {
    let object: serde_json::Map<String, Value> =
        row.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
    Value::Object(object).to_string()
}

impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Dataset {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Build a [`Row`] from `column => value` pairs.
///
/// ```
/// use wrangler::row;
///
/// let r = row! { "name" => "Alice", "age" => 30 };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.insert(String::from($key), $crate::CellValue::from($value)); )+
        row
    }};
}
