//! Transformation operations: reshaping columns, sorting, filtering and
//! value conversion.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Utc};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::inference::round_to;
use crate::value::{format_number, parse_date, CellValue, ColumnType, Dataset, Row};

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One key of a multi-column sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
}

/// A single row predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: CellValue,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl Into<CellValue>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate the predicate against a row.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(&self.column).unwrap_or(&CellValue::Null);
        match self.operator {
            FilterOperator::Equals => loosely_equal(cell, &self.value),
            FilterOperator::NotEquals => !loosely_equal(cell, &self.value),
            FilterOperator::Contains => contains_ignore_case(cell, &self.value),
            FilterOperator::NotContains => !contains_ignore_case(cell, &self.value),
            FilterOperator::GreaterThan => compare_numbers(cell, &self.value) == Some(Ordering::Greater),
            FilterOperator::LessThan => compare_numbers(cell, &self.value) == Some(Ordering::Less),
        }
    }
}

/// Rounding settings for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    pub column: String,
    pub decimals: u32,
    #[serde(default)]
    pub keep_original: bool,
}

/// Rename keys in every row. Unmapped keys keep their name and position.
pub fn rename_columns(data: &Dataset, mapping: &IndexMap<String, String>) -> Dataset {
    data.iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| (mapping.get(k).unwrap_or(k).clone(), v.clone()))
                .collect()
        })
        .collect()
}

/// Rebuild rows in the given column order.
///
/// Names in `order` that are not existing columns are ignored, and existing
/// columns left out of `order` are appended at the end.
pub fn reorder_columns(data: &Dataset, order: &[String]) -> Dataset {
    let existing = data.columns();
    let mut final_order: IndexSet<&str> = order
        .iter()
        .filter(|c| existing.contains(c))
        .map(String::as_str)
        .collect();
    final_order.extend(existing.iter().map(String::as_str));

    data.iter()
        .map(|row| {
            let mut rebuilt: Row = final_order
                .iter()
                .filter_map(|c| row.get(*c).map(|v| (c.to_string(), v.clone())))
                .collect();
            for (k, v) in row {
                if !rebuilt.contains_key(k) {
                    rebuilt.insert(k.clone(), v.clone());
                }
            }
            rebuilt
        })
        .collect()
}

/// Split a column on `delimiter` into positional new columns.
///
/// Missing parts become empty strings and surplus parts are dropped. The
/// source column is removed unless `keep_original` is set.
pub fn split_column(
    data: &Dataset,
    column: &str,
    delimiter: &str,
    new_names: &[String],
    keep_original: bool,
) -> Dataset {
    data.iter()
        .map(|row| {
            let text = row.get(column).map(|v| v.to_string()).unwrap_or_default();
            let parts: Vec<&str> = if delimiter.is_empty() || text.is_empty() {
                vec![text.as_str()]
            } else {
                text.split(delimiter).collect()
            };

            let mut row = row.clone();
            for (i, name) in new_names.iter().enumerate() {
                let part = parts.get(i).copied().unwrap_or("");
                row.insert(name.clone(), CellValue::text(part));
            }
            if !keep_original && !new_names.iter().any(|n| n == column) {
                row.shift_remove(column);
            }
            row
        })
        .collect()
}

/// Join the text of several columns into one.
///
/// Null cells contribute an empty string. Source columns are removed unless
/// `keep_originals` is set.
pub fn merge_columns(
    data: &Dataset,
    columns: &[String],
    new_name: &str,
    delimiter: &str,
    keep_originals: bool,
) -> Dataset {
    data.iter()
        .map(|row| {
            let merged = columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(delimiter);

            let mut row = row.clone();
            if !keep_originals {
                for c in columns.iter().filter(|c| c.as_str() != new_name) {
                    row.shift_remove(c);
                }
            }
            row.insert(new_name.to_string(), CellValue::String(merged));
            row
        })
        .collect()
}

/// Add a column computed from each row.
///
/// A row whose computation fails gets a null cell; the other rows are
/// unaffected.
pub fn create_calculated_column<F>(data: &Dataset, new_name: &str, compute: F) -> Dataset
where
    F: Fn(&Row) -> Result<CellValue>,
{
    let mut failures = 0usize;
    let out = data
        .iter()
        .map(|row| {
            let value = compute(row).unwrap_or_else(|_| {
                failures += 1;
                CellValue::Null
            });
            let mut row = row.clone();
            row.insert(new_name.to_string(), value);
            row
        })
        .collect();

    if failures > 0 {
        warn!(column = new_name, failures, "calculated column left rows null");
    }
    out
}

/// Stable multi-key sort.
///
/// Nulls sort first ascending and last descending. Two numbers compare
/// numerically, two strings compare case-insensitively with a case-sensitive
/// tie-break, anything else compares as text. Ties fall through to the next key.
pub fn sort_data(data: &Dataset, keys: &[SortKey]) -> Dataset {
    let mut rows = data.rows().to_vec();
    rows.sort_by(|a, b| {
        for key in keys {
            let left = a.get(&key.column).unwrap_or(&CellValue::Null);
            let right = b.get(&key.column).unwrap_or(&CellValue::Null);
            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => match key.direction {
                    SortDirection::Asc => Ordering::Less,
                    SortDirection::Desc => Ordering::Greater,
                },
                (false, true) => match key.direction {
                    SortDirection::Asc => Ordering::Greater,
                    SortDirection::Desc => Ordering::Less,
                },
                (false, false) => {
                    let ordering = compare_cells(left, right);
                    match key.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Dataset::new(rows)
}

fn compare_cells(left: &CellValue, right: &CellValue) -> Ordering {
    match (left, right) {
        (CellValue::Number(a), CellValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
        (CellValue::String(a), CellValue::String(b)) => compare_text(a, b),
        _ => compare_text(&left.to_string(), &right.to_string()),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Keep rows matching every filter.
pub fn filter_data(data: &Dataset, filters: &[Filter]) -> Dataset {
    data.iter()
        .filter(|row| filters.iter().all(|f| f.matches(row)))
        .cloned()
        .collect()
}

fn loosely_equal(cell: &CellValue, value: &CellValue) -> bool {
    match (cell.numeric_value(), value.numeric_value()) {
        (Some(a), Some(b)) => a == b,
        _ => cell.to_string() == value.to_string(),
    }
}

fn contains_ignore_case(cell: &CellValue, value: &CellValue) -> bool {
    cell.to_string()
        .to_lowercase()
        .contains(&value.to_string().to_lowercase())
}

fn compare_numbers(cell: &CellValue, value: &CellValue) -> Option<Ordering> {
    if cell.is_empty() {
        return None;
    }
    let a = cell.to_number()?;
    let b = value.to_number()?;
    a.partial_cmp(&b)
}

/// Round numeric cells to a number of decimal places.
///
/// With `keep_original`, the unrounded value is kept in `<column>_original`.
/// Non-numeric cells are left untouched.
pub fn round_values(data: &Dataset, configs: &[RoundConfig]) -> Dataset {
    data.iter()
        .map(|row| {
            let mut row = row.clone();
            for config in configs {
                let Some(cell) = row.get(&config.column) else {
                    continue;
                };
                let Some(number) = cell.numeric_value() else {
                    continue;
                };
                let original = cell.clone();
                row.insert(
                    config.column.clone(),
                    CellValue::Number(round_to(number, config.decimals)),
                );
                if config.keep_original {
                    row.insert(format!("{}_original", config.column), original);
                }
            }
            row
        })
        .collect()
}

/// Convert columns to a target type.
///
/// Values that cannot convert become null. Text is true when it reads
/// `true`, `yes`, `1` or `y` (any case) and false otherwise. `Unknown`
/// targets leave the column alone.
pub fn convert_data_types(data: &Dataset, conversions: &IndexMap<String, ColumnType>) -> Dataset {
    data.iter()
        .map(|row| {
            let mut row = row.clone();
            for (column, target) in conversions {
                if let Some(cell) = row.get_mut(column) {
                    *cell = convert_cell(cell, *target);
                }
            }
            row
        })
        .collect()
}

/// Convert one cell to a target type.
pub fn convert_cell(cell: &CellValue, target: ColumnType) -> CellValue {
    if cell.is_null() {
        return CellValue::Null;
    }
    match target {
        ColumnType::String => CellValue::String(cell.to_string()),
        ColumnType::Number => cell.to_number().map(CellValue::Number).unwrap_or(CellValue::Null),
        ColumnType::Boolean => CellValue::Bool(match cell {
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Date(_) => true,
            other => matches!(
                other.to_string().trim().to_lowercase().as_str(),
                "true" | "yes" | "1" | "y"
            ),
        }),
        ColumnType::Date => match cell {
            CellValue::Number(n) => DateTime::<Utc>::from_timestamp_millis(*n as i64)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Null),
            other => other.to_date().map(CellValue::Date).unwrap_or(CellValue::Null),
        },
        ColumnType::Unknown => cell.clone(),
    }
}

/// Re-render parseable dates using `YYYY`, `MM` and `DD` tokens.
/// Anything that does not parse as a date is left unchanged.
pub fn format_dates(data: &Dataset, columns: &[String], format: &str) -> Dataset {
    data.iter()
        .map(|row| {
            let mut row = row.clone();
            for column in columns {
                if let Some(cell) = row.get_mut(column) {
                    let date = match cell {
                        CellValue::Date(d) => Some(*d),
                        CellValue::String(s) => parse_date(s),
                        _ => None,
                    };
                    if let Some(date) = date {
                        *cell = CellValue::String(render_date(&date, format));
                    }
                }
            }
            row
        })
        .collect()
}

fn render_date(date: &DateTime<Utc>, format: &str) -> String {
    format
        .replace("YYYY", &format!("{:04}", date.year()))
        .replace("MM", &format!("{:02}", date.month()))
        .replace("DD", &format!("{:02}", date.day()))
}

/// Bucket numeric values into ranges bounded by `bins`.
///
/// Bins are sorted ascending. A value lands in the first bin boundary that is
/// greater than or equal to it; values above every boundary land in a final
/// overflow bucket. `labels[i]` names bucket `i` when given, otherwise labels
/// read `<= b0`, `b0 to b1`, ..., `> bn`. Non-numeric values become null.
pub fn bin_values(
    data: &Dataset,
    column: &str,
    bins: &[f64],
    labels: Option<&[String]>,
    new_column_name: &str,
) -> Dataset {
    let mut sorted: Vec<f64> = bins.iter().copied().filter(|b| b.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    data.iter()
        .map(|row| {
            let value = row.get(column).and_then(CellValue::numeric_value);
            let label = match value {
                Some(v) if !sorted.is_empty() => {
                    let index = sorted.iter().position(|b| v <= *b).unwrap_or(sorted.len());
                    CellValue::String(bin_label(&sorted, labels, index))
                }
                _ => CellValue::Null,
            };
            let mut row = row.clone();
            row.insert(new_column_name.to_string(), label);
            row
        })
        .collect()
}

fn bin_label(sorted: &[f64], labels: Option<&[String]>, index: usize) -> String {
    if let Some(label) = labels.and_then(|l| l.get(index)) {
        return label.clone();
    }
    if index == 0 {
        format!("<= {}", format_number(sorted[0]))
    } else if index == sorted.len() {
        format!("> {}", format_number(sorted[index - 1]))
    } else {
        format!(
            "{} to {}",
            format_number(sorted[index - 1]),
            format_number(sorted[index])
        )
    }
}

/// Copy the first regex match of a column into a new column.
///
/// Uses capture `group` when given, otherwise group 1 if the pattern has
/// groups, else the whole match. No match or an empty cell gives null.
pub fn extract_pattern(
    data: &Dataset,
    column: &str,
    pattern: &str,
    new_column_name: &str,
    group: Option<usize>,
) -> Result<Dataset> {
    let regex = Regex::new(pattern)?;
    let group = group.unwrap_or(if regex.captures_len() > 1 { 1 } else { 0 });

    Ok(data
        .iter()
        .map(|row| {
            let extracted = row
                .get(column)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .and_then(|text| {
                    regex
                        .captures(&text)
                        .and_then(|caps| caps.get(group))
                        .map(|m| CellValue::text(m.as_str()))
                })
                .unwrap_or(CellValue::Null);
            let mut row = row.clone();
            row.insert(new_column_name.to_string(), extracted);
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WranglerError;
    use crate::row;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn people() -> Dataset {
        Dataset::new(vec![
            row! { "name" => "Carol", "age" => 35, "city" => "Paris" },
            row! { "name" => "alice", "age" => 30, "city" => "Berlin" },
            row! { "name" => "Bob", "age" => CellValue::Null, "city" => "Paris" },
        ])
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut mapping = IndexMap::new();
        mapping.insert("age".to_string(), "years".to_string());
        let out = rename_columns(&people(), &mapping);
        assert_eq!(out.columns(), vec!["name", "years", "city"]);
    }

    #[test]
    fn test_reorder_appends_omitted_and_ignores_unknown() {
        let out = reorder_columns(&people(), &cols(&["city", "ghost"]));
        assert_eq!(out.columns(), vec!["city", "name", "age"]);
    }

    #[test]
    fn test_split_column() {
        let data = Dataset::new(vec![row! { "full" => "Ada Lovelace" }, row! { "full" => "Plato" }]);
        let out = split_column(&data, "full", " ", &cols(&["first", "last"]), false);
        assert_eq!(out.columns(), vec!["first", "last"]);
        assert_eq!(out.get(1, "last"), Some(&CellValue::text("")));
    }

    #[test]
    fn test_merge_columns() {
        let data = Dataset::new(vec![row! { "f" => "Ada", "l" => CellValue::Null }]);
        let out = merge_columns(&data, &cols(&["f", "l"]), "full", " ", false);
        assert_eq!(out.columns(), vec!["full"]);
        assert_eq!(out.get(0, "full"), Some(&CellValue::text("Ada ")));
    }

    #[test]
    fn test_calculated_column_nulls_failed_rows() {
        let out = create_calculated_column(&people(), "next", |row| {
            row.get("age")
                .and_then(CellValue::numeric_value)
                .map(|a| CellValue::Number(a + 1.0))
                .ok_or_else(|| WranglerError::Formula("no age".into()))
        });
        assert_eq!(out.get(0, "next"), Some(&CellValue::Number(36.0)));
        assert_eq!(out.get(2, "next"), Some(&CellValue::Null));
    }

    #[test]
    fn test_sort_nulls_first_ascending_last_descending() {
        let asc = sort_data(&people(), &[SortKey::asc("age")]);
        let names: Vec<_> = asc.column_values("name").map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["Bob", "alice", "Carol"]);

        let desc = sort_data(&people(), &[SortKey::desc("age")]);
        let names: Vec<_> = desc.column_values("name").map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["Carol", "alice", "Bob"]);
    }

    #[test]
    fn test_sort_strings_case_insensitive_and_multi_key() {
        let out = sort_data(&people(), &[SortKey::asc("city"), SortKey::asc("name")]);
        let names: Vec<_> = out.column_values("name").map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_filter_and_combines() {
        let filters = vec![
            Filter::new("city", FilterOperator::Equals, "Paris"),
            Filter::new("age", FilterOperator::GreaterThan, 31),
        ];
        let out = filter_data(&people(), &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0, "name"), Some(&CellValue::text("Carol")));

        let out = filter_data(&people(), &[Filter::new("name", FilterOperator::Contains, "AL")]);
        assert_eq!(out.len(), 1);
        let out = filter_data(&people(), &[Filter::new("age", FilterOperator::LessThan, 100)]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_round_values_keep_original() {
        let data = Dataset::new(vec![row! { "p" => 3.14159, "s" => "x" }]);
        let configs = vec![
            RoundConfig { column: "p".into(), decimals: 2, keep_original: true },
            RoundConfig { column: "s".into(), decimals: 0, keep_original: false },
        ];
        let out = round_values(&data, &configs);
        assert_eq!(out.get(0, "p"), Some(&CellValue::Number(3.14)));
        assert_eq!(out.get(0, "p_original"), Some(&CellValue::Number(3.14159)));
        assert_eq!(out.get(0, "s"), Some(&CellValue::text("x")));
    }

    #[test]
    fn test_round_values_huge_decimals() {
        let data = Dataset::new(vec![row! { "p" => 0.0 }, row! { "p" => 2.5 }]);
        let configs = vec![RoundConfig { column: "p".into(), decimals: 400, keep_original: false }];
        let out = round_values(&data, &configs);
        assert_eq!(out, data);
    }

    #[test]
    fn test_convert_data_types() {
        let data = Dataset::new(vec![
            row! { "n" => "12", "b" => "Yes", "d" => "2024-01-15", "s" => 5 },
            row! { "n" => "abc", "b" => "nope", "d" => "soon", "s" => true },
        ]);
        let mut conversions = IndexMap::new();
        conversions.insert("n".to_string(), ColumnType::Number);
        conversions.insert("b".to_string(), ColumnType::Boolean);
        conversions.insert("d".to_string(), ColumnType::Date);
        conversions.insert("s".to_string(), ColumnType::String);
        let out = convert_data_types(&data, &conversions);

        assert_eq!(out.get(0, "n"), Some(&CellValue::Number(12.0)));
        assert_eq!(out.get(1, "n"), Some(&CellValue::Null));
        assert_eq!(out.get(0, "b"), Some(&CellValue::Bool(true)));
        assert_eq!(out.get(1, "b"), Some(&CellValue::Bool(false)));
        assert!(matches!(out.get(0, "d"), Some(CellValue::Date(_))));
        assert_eq!(out.get(1, "d"), Some(&CellValue::Null));
        assert_eq!(out.get(1, "s"), Some(&CellValue::text("true")));
    }

    #[test]
    fn test_format_dates() {
        let data = Dataset::new(vec![row! { "d" => "03/04/2024" }, row! { "d" => "later" }]);
        let out = format_dates(&data, &cols(&["d"]), "DD.MM.YYYY");
        assert_eq!(out.get(0, "d"), Some(&CellValue::text("04.03.2024")));
        assert_eq!(out.get(1, "d"), Some(&CellValue::text("later")));
    }

    #[test]
    fn test_bin_values() {
        let data: Dataset = [5, 15, 25, 99]
            .into_iter()
            .map(|v| row! { "age" => v })
            .chain(std::iter::once(row! { "age" => "n/a" }))
            .collect();
        let out = bin_values(&data, "age", &[20.0, 10.0], None, "band");
        let bands: Vec<_> = out.column_values("band").cloned().collect();
        assert_eq!(
            bands,
            vec![
                CellValue::text("<= 10"),
                CellValue::text("10 to 20"),
                CellValue::text("> 20"),
                CellValue::text("> 20"),
                CellValue::Null,
            ]
        );

        let labels = cols(&["young", "mid", "old"]);
        let out = bin_values(&data, "age", &[10.0, 20.0], Some(&labels), "band");
        assert_eq!(out.get(1, "band"), Some(&CellValue::text("mid")));
    }

    #[test]
    fn test_extract_pattern() {
        let data = Dataset::new(vec![row! { "email" => "ada@example.com" }, row! { "email" => "none" }]);
        let out = extract_pattern(&data, "email", r"@(.+)$", "domain", None).unwrap();
        assert_eq!(out.get(0, "domain"), Some(&CellValue::text("example.com")));
        assert_eq!(out.get(1, "domain"), Some(&CellValue::Null));
    }
}
