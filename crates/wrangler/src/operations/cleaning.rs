//! Cleaning operations.
//!
//! Every function takes the current dataset by reference and returns a new
//! one. Cells an operation does not apply to are passed through untouched.

use std::collections::HashSet;

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inference::{iqr_bounds, mean, median, mode, numeric_values};
use crate::value::{row_fingerprint, CellValue, Dataset, Row};

/// Pattern used by [`remove_special_characters`] when none is given.
pub const DEFAULT_SPECIAL_CHARACTERS: &str = "[^a-zA-Z0-9 ]";

/// How [`fill_missing_values`] picks the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// A caller-supplied literal.
    Value,
    /// Mean of the column's numeric values.
    Mean,
    /// Median of the column's numeric values.
    Median,
    /// Most frequent non-empty value.
    Mode,
}

/// Target letter case for [`standardize_text_case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    Uppercase,
    Lowercase,
    Titlecase,
}

/// Keep the first row for each composite key.
///
/// The key joins the JSON form of each key column with `|`. With no keys,
/// the whole row, column names included, is the key.
pub fn remove_duplicates(data: &Dataset, keys: Option<&[String]>) -> Dataset {
    let mut seen = HashSet::with_capacity(data.len());
    data.iter()
        .filter(|row| seen.insert(composite_key(row, keys)))
        .cloned()
        .collect()
}

fn composite_key(row: &Row, keys: Option<&[String]>) -> String {
    match keys {
        Some(keys) if !keys.is_empty() => keys
            .iter()
            .map(|k| row.get(k).unwrap_or(&CellValue::Null).to_json().to_string())
            .collect::<Vec<_>>()
            .join("|"),
        _ => row_fingerprint(row),
    }
}

/// Trim leading and trailing whitespace in string cells.
pub fn trim_whitespace(data: &Dataset, columns: Option<&[String]>) -> Dataset {
    map_string_cells(data, columns, |s| Some(s.trim().to_string()))
}

/// Drop rows where any target column is null or empty.
///
/// With no columns, every column of the dataset is a target, so a row must be
/// fully populated to survive.
pub fn remove_null_rows(data: &Dataset, columns: Option<&[String]>) -> Dataset {
    let targets = target_columns(data, columns);
    data.iter()
        .filter(|row| {
            targets
                .iter()
                .all(|c| !row.get(c).unwrap_or(&CellValue::Null).is_empty())
        })
        .cloned()
        .collect()
}

/// Remove columns whose every value is null or empty.
pub fn drop_empty_columns(data: &Dataset) -> Dataset {
    let empty: Vec<String> = data
        .all_columns()
        .into_iter()
        .filter(|c| data.column_values(c).all(CellValue::is_empty))
        .collect();
    remove_columns(data, &empty)
}

/// Remove the named columns from every row.
pub fn remove_columns(data: &Dataset, columns: &[String]) -> Dataset {
    if columns.is_empty() {
        return data.clone();
    }
    data.iter()
        .map(|row| {
            row.iter()
                .filter(|(k, _)| !columns.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .collect()
}

/// Fill null or empty cells, computing the replacement per column.
///
/// Mean and median use the column's numeric values; a column without any
/// falls back to `value`, or is left as is when no value is supplied.
pub fn fill_missing_values(
    data: &Dataset,
    columns: &[String],
    method: FillMethod,
    value: Option<&CellValue>,
) -> Dataset {
    let fills: Vec<(String, CellValue)> = columns
        .iter()
        .filter_map(|column| {
            let fill = match method {
                FillMethod::Value => value.cloned(),
                FillMethod::Mean => mean(&numeric_values(data, column))
                    .map(CellValue::Number)
                    .or_else(|| value.cloned()),
                FillMethod::Median => median(&numeric_values(data, column))
                    .map(CellValue::Number)
                    .or_else(|| value.cloned()),
                FillMethod::Mode => mode(data.column_values(column)).or_else(|| value.cloned()),
            };
            fill.map(|f| (column.clone(), f))
        })
        .collect();

    data.iter()
        .map(|row| {
            let mut row = row.clone();
            for (column, fill) in &fills {
                let cell = row.entry(column.clone()).or_insert(CellValue::Null);
                if cell.is_empty() {
                    *cell = fill.clone();
                }
            }
            row
        })
        .collect()
}

/// Change the letter case of string cells.
pub fn standardize_text_case(data: &Dataset, columns: &[String], case: TextCase) -> Dataset {
    map_string_cells(data, Some(columns), |s| {
        Some(match case {
            TextCase::Uppercase => s.to_uppercase(),
            TextCase::Lowercase => s.to_lowercase(),
            TextCase::Titlecase => title_case(s),
        })
    })
}

/// Capitalize the first letter of each whitespace-delimited word and
/// lowercase the rest, preserving the original whitespace.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Delete every match of `pattern` from string cells.
pub fn remove_special_characters(
    data: &Dataset,
    columns: &[String],
    pattern: Option<&str>,
) -> Result<Dataset> {
    let regex = Regex::new(pattern.unwrap_or(DEFAULT_SPECIAL_CHARACTERS))?;
    Ok(map_string_cells(data, Some(columns), |s| {
        Some(regex.replace_all(s, "").into_owned())
    }))
}

/// Replace every literal occurrence of `find` in string cells.
///
/// An empty `find` leaves the data unchanged.
pub fn find_and_replace(
    data: &Dataset,
    columns: &[String],
    find: &str,
    replace: &str,
    case_sensitive: bool,
) -> Result<Dataset> {
    if find.is_empty() {
        return Ok(data.clone());
    }
    let regex = RegexBuilder::new(&regex::escape(find))
        .case_insensitive(!case_sensitive)
        .build()?;
    Ok(map_string_cells(data, Some(columns), |s| {
        Some(regex.replace_all(s, NoExpand(replace)).into_owned())
    }))
}

/// Drop rows whose numeric value in any target column lies outside the IQR
/// fences of that column.
pub fn remove_outliers(data: &Dataset, columns: &[String], multiplier: f64) -> Dataset {
    let fences: Vec<(&String, f64, f64)> = columns
        .iter()
        .filter_map(|c| iqr_bounds(&numeric_values(data, c), multiplier).map(|(lo, hi)| (c, lo, hi)))
        .collect();

    data.iter()
        .filter(|row| {
            fences.iter().all(|(column, lower, upper)| {
                match row.get(*column).and_then(CellValue::numeric_value) {
                    Some(v) => v >= *lower && v <= *upper,
                    None => true,
                }
            })
        })
        .cloned()
        .collect()
}

/// Resolve optional target columns, defaulting to every column.
pub(crate) fn target_columns(data: &Dataset, columns: Option<&[String]>) -> Vec<String> {
    match columns {
        Some(columns) if !columns.is_empty() => columns.to_vec(),
        _ => data.all_columns(),
    }
}

/// Rewrite string cells in the target columns. Returning `None` keeps the cell.
pub(crate) fn map_string_cells<F>(data: &Dataset, columns: Option<&[String]>, f: F) -> Dataset
where
    F: Fn(&str) -> Option<String>,
{
    let targets = target_columns(data, columns);
    data.iter()
        .map(|row| {
            let mut row = row.clone();
            for column in &targets {
                if let Some(CellValue::String(s)) = row.get_mut(column) {
                    if let Some(new_value) = f(s) {
                        *s = new_value;
                    }
                }
            }
            row
        })
        .collect()
}
