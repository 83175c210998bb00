//! Rule-based suggestion generation from dataset statistics.
//!
//! Each rule inspects the issue report or a sample of column values and
//! proposes at most a handful of operations. Confidence values are fixed per
//! rule; they rank suggestions, they do not measure the data.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inference::{infer_column_types, DEFAULT_SAMPLE_SIZE};
use crate::issues::{DataIssues, IssueDetector};
use crate::operations::{FillMethod, Operation, TextCase};
use crate::value::{CellValue, ColumnType, Dataset};

use super::{Suggestion, SuggestionType};

const DUPLICATE_CONFIDENCE: u8 = 95;
const WHITESPACE_CONFIDENCE: u8 = 90;
const INCONSISTENT_TYPE_CONFIDENCE: u8 = 85;
const MODERATE_MISSING_CONFIDENCE: u8 = 80;
const DATE_FORMAT_CONFIDENCE: u8 = 80;
const LOW_MISSING_CONFIDENCE: u8 = 75;
const TEXT_CASE_CONFIDENCE: u8 = 75;
const HIGH_MISSING_CONFIDENCE: u8 = 70;
const OUTLIER_CONFIDENCE: u8 = 70;
const NAME_MERGE_CONFIDENCE: u8 = 60;

/// Target layout for the date-standardization suggestion.
pub const STANDARD_DATE_FORMAT: &str = "YYYY-MM-DD";

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{1,2}-\d{1,2}",
        r"^\d{4}/\d{1,2}/\d{1,2}$",
        r"^\d{1,2}/\d{1,2}/\d{2,4}$",
        r"^\d{1,2}-\d{1,2}-\d{4}$",
        r"^\d{1,2}\.\d{1,2}\.\d{4}$",
        r"^[A-Za-z]{3,9}\.? \d{1,2},? \d{4}$",
        r"^\d{1,2} [A-Za-z]{3,9}\.? \d{4}$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static ISO_DATE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

const FIRST_NAME_HINTS: &[&str] = &["firstname", "first", "fname", "givenname", "forename"];
const LAST_NAME_HINTS: &[&str] = &["lastname", "last", "lname", "surname", "familyname"];

/// Thresholds for the suggestion rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Missing share (percent) at or above which dropping the column is proposed.
    pub high_missing_pct: f64,
    /// Missing share (percent) at or above which filling is proposed.
    pub moderate_missing_pct: f64,
    /// Rows sampled per column for text checks.
    pub sample_size: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            high_missing_pct: 50.0,
            moderate_missing_pct: 10.0,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Generates suggestions from a dataset using fixed rules.
#[derive(Debug, Clone, Default)]
pub struct SuggestionGenerator {
    config: SuggestionConfig,
}

impl SuggestionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SuggestionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Scan the dataset and generate suggestions.
    pub fn generate(&self, data: &Dataset) -> Vec<Suggestion> {
        let issues = IssueDetector::new()
            .with_sample_size(self.config.sample_size)
            .detect(data);
        self.generate_with_issues(data, &issues)
    }

    /// Generate suggestions from an issue report that was already computed.
    ///
    /// Results are ordered by confidence, highest first.
    pub fn generate_with_issues(&self, data: &Dataset, issues: &DataIssues) -> Vec<Suggestion> {
        if data.is_empty() {
            return Vec::new();
        }

        let columns = data.all_columns();
        let types = infer_column_types(data, &columns, self.config.sample_size);

        let mut suggestions = Vec::new();
        suggestions.extend(self.suggest_missing_values(data, issues, &types));
        suggestions.extend(self.suggest_remove_duplicates(issues));
        suggestions.extend(self.suggest_type_conversions(data, issues));
        suggestions.extend(self.suggest_remove_outliers(issues));
        suggestions.extend(self.suggest_trim_whitespace(data, &columns));
        suggestions.extend(self.suggest_text_case(data, &columns));
        suggestions.extend(self.suggest_name_merge(&columns));
        suggestions.extend(self.suggest_date_format(data, &columns));

        suggestions.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        debug!(count = suggestions.len(), "generated suggestions");
        suggestions
    }

    /// Missing values, bucketed by share of rows.
    fn suggest_missing_values(
        &self,
        data: &Dataset,
        issues: &DataIssues,
        types: &IndexMap<String, ColumnType>,
    ) -> Vec<Suggestion> {
        let rows = data.len() as f64;
        let mut high = Vec::new();
        let mut low = Vec::new();
        let mut low_rows = 0;
        let mut out = Vec::new();

        for (column, count) in &issues.null_values {
            let pct = 100.0 * *count as f64 / rows;
            if pct >= self.config.high_missing_pct {
                high.push(column.clone());
            } else if pct >= self.config.moderate_missing_pct {
                let numeric = types.get(column).is_some_and(ColumnType::is_numeric);
                let method = if numeric {
                    FillMethod::Median
                } else {
                    FillMethod::Mode
                };
                let op = Operation::FillMissingValues {
                    columns: vec![column.clone()],
                    method,
                    value: None,
                };
                out.push(
                    Suggestion::new(
                        SuggestionType::Cleaning,
                        format!("Fill missing values in '{}'", column),
                        &op,
                    )
                    .with_description(format!(
                        "{:.1}% of '{}' is empty. Fill the gaps with the column {}.",
                        pct,
                        column,
                        if numeric { "median" } else { "most common value" }
                    ))
                    .with_confidence(MODERATE_MISSING_CONFIDENCE)
                    .with_affected_rows(*count),
                );
            } else {
                low_rows = low_rows.max(*count);
                low.push(column.clone());
            }
        }

        if !high.is_empty() {
            let op = Operation::RemoveColumns {
                columns: high.clone(),
            };
            out.push(
                Suggestion::new(SuggestionType::Cleaning, "Remove mostly empty columns", &op)
                    .with_description(format!(
                        "{} column(s) are at least {:.0}% empty: {}.",
                        high.len(),
                        self.config.high_missing_pct,
                        high.join(", ")
                    ))
                    .with_confidence(HIGH_MISSING_CONFIDENCE),
            );
        }

        if !low.is_empty() {
            let op = Operation::RemoveNullRows {
                columns: Some(low.clone()),
            };
            out.push(
                Suggestion::new(SuggestionType::Cleaning, "Remove rows with missing values", &op)
                    .with_description(format!(
                        "A few rows have empty values in {}. Removing them loses little data.",
                        low.join(", ")
                    ))
                    .with_confidence(LOW_MISSING_CONFIDENCE)
                    .with_affected_rows(low_rows),
            );
        }

        out
    }

    fn suggest_remove_duplicates(&self, issues: &DataIssues) -> Option<Suggestion> {
        if issues.duplicate_rows == 0 {
            return None;
        }
        let op = Operation::RemoveDuplicates { keys: None };
        Some(
            Suggestion::new(SuggestionType::Cleaning, "Remove duplicate rows", &op)
                .with_description(format!(
                    "Found {} row(s) that exactly repeat an earlier row.",
                    issues.duplicate_rows
                ))
                .with_confidence(DUPLICATE_CONFIDENCE)
                .with_affected_rows(issues.duplicate_rows),
        )
    }

    /// One conversion per mixed-type column, towards its most common type.
    fn suggest_type_conversions(&self, data: &Dataset, issues: &DataIssues) -> Vec<Suggestion> {
        issues
            .inconsistent_types
            .iter()
            .filter_map(|column| {
                let target = self.dominant_type(data, column)?;
                let mut conversions = IndexMap::new();
                conversions.insert(column.clone(), target);
                let op = Operation::ConvertDataTypes { conversions };
                Some(
                    Suggestion::new(
                        SuggestionType::Validation,
                        format!("Convert '{}' to {}", column, target.label()),
                        &op,
                    )
                    .with_description(format!(
                        "'{}' mixes value types. Most values are {}; values that do not convert become empty.",
                        column,
                        target.label()
                    ))
                    .with_confidence(INCONSISTENT_TYPE_CONFIDENCE),
                )
            })
            .collect()
    }

    fn dominant_type(&self, data: &Dataset, column: &str) -> Option<ColumnType> {
        let mut counts: IndexMap<ColumnType, usize> = IndexMap::new();
        for value in data
            .column_values(column)
            .filter(|v| !v.is_empty())
            .take(self.config.sample_size)
        {
            *counts.entry(value.refined_type()).or_insert(0) += 1;
        }

        let mut best: Option<(ColumnType, usize)> = None;
        for (t, count) in counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((t, count));
            }
        }
        best.map(|(t, _)| t)
    }

    fn suggest_remove_outliers(&self, issues: &DataIssues) -> Option<Suggestion> {
        if issues.outliers.is_empty() {
            return None;
        }
        let columns: Vec<String> = issues.outliers.keys().cloned().collect();
        let total: usize = issues.outliers.values().map(Vec::len).sum();
        let op = Operation::RemoveOutliers {
            columns: columns.clone(),
            multiplier: None,
        };
        Some(
            Suggestion::new(SuggestionType::Cleaning, "Handle outliers", &op)
                .with_description(format!(
                    "{} value(s) fall outside 1.5×IQR in {}. Review them or remove those rows.",
                    total,
                    columns.join(", ")
                ))
                .with_confidence(OUTLIER_CONFIDENCE)
                .with_affected_rows(total),
        )
    }

    fn suggest_trim_whitespace(&self, data: &Dataset, columns: &[String]) -> Option<Suggestion> {
        let padded: Vec<String> = columns
            .iter()
            .filter(|c| {
                self.sampled_strings(data, c)
                    .any(|s| s.trim() != s)
            })
            .cloned()
            .collect();
        if padded.is_empty() {
            return None;
        }
        let op = Operation::TrimWhitespace {
            columns: Some(padded.clone()),
        };
        Some(
            Suggestion::new(SuggestionType::Cleaning, "Trim whitespace", &op)
                .with_description(format!(
                    "Values in {} have leading or trailing spaces.",
                    padded.join(", ")
                ))
                .with_confidence(WHITESPACE_CONFIDENCE),
        )
    }

    /// Columns where values differ only by letter case.
    fn suggest_text_case(&self, data: &Dataset, columns: &[String]) -> Option<Suggestion> {
        let mixed: Vec<String> = columns
            .iter()
            .filter(|c| {
                let raw: HashSet<&str> = self.sampled_strings(data, c).collect();
                let lowered: HashSet<String> = raw.iter().map(|s| s.to_lowercase()).collect();
                lowered.len() < raw.len()
            })
            .cloned()
            .collect();
        if mixed.is_empty() {
            return None;
        }
        let op = Operation::StandardizeTextCase {
            columns: mixed.clone(),
            case_type: TextCase::Titlecase,
        };
        Some(
            Suggestion::new(SuggestionType::Formatting, "Standardize text case", &op)
                .with_description(format!(
                    "{} contain the same values written with different capitalization.",
                    mixed.join(", ")
                ))
                .with_confidence(TEXT_CASE_CONFIDENCE),
        )
    }

    fn suggest_name_merge(&self, columns: &[String]) -> Option<Suggestion> {
        let first = columns.iter().find(|c| is_name_column(c, FIRST_NAME_HINTS))?;
        let last = columns.iter().find(|c| is_name_column(c, LAST_NAME_HINTS))?;
        let op = Operation::MergeColumns {
            columns: vec![first.clone(), last.clone()],
            new_name: "full_name".to_string(),
            delimiter: " ".to_string(),
            keep_originals: true,
        };
        Some(
            Suggestion::new(SuggestionType::Transformation, "Create full name column", &op)
                .with_description(format!(
                    "Combine '{}' and '{}' into a single 'full_name' column.",
                    first, last
                ))
                .with_confidence(NAME_MERGE_CONFIDENCE),
        )
    }

    /// Text columns whose values all look like dates but are not all ISO.
    fn suggest_date_format(&self, data: &Dataset, columns: &[String]) -> Option<Suggestion> {
        let date_columns: Vec<String> = columns
            .iter()
            .filter(|c| {
                let values: Vec<&str> = self.sampled_strings(data, c).map(str::trim).collect();
                !values.is_empty()
                    && values
                        .iter()
                        .all(|v| DATE_PATTERNS.iter().any(|p| p.is_match(v)))
                    && !values
                        .iter()
                        .all(|v| ISO_DATE.as_ref().is_some_and(|iso| iso.is_match(v)))
            })
            .cloned()
            .collect();
        if date_columns.is_empty() {
            return None;
        }
        let op = Operation::FormatDates {
            columns: date_columns.clone(),
            format: STANDARD_DATE_FORMAT.to_string(),
        };
        Some(
            Suggestion::new(SuggestionType::Formatting, "Standardize date format", &op)
                .with_description(format!(
                    "Rewrite dates in {} as {}.",
                    date_columns.join(", "),
                    STANDARD_DATE_FORMAT
                ))
                .with_confidence(DATE_FORMAT_CONFIDENCE),
        )
    }

    /// Non-empty string cells among the first `sample_size` rows.
    fn sampled_strings<'a>(
        &self,
        data: &'a Dataset,
        column: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        data.rows()
            .iter()
            .take(self.config.sample_size)
            .filter_map(move |row| match row.get(column) {
                Some(CellValue::String(s)) if !s.is_empty() => Some(s.as_str()),
                _ => None,
            })
    }
}

/// Compare a column name against hints after dropping case, spaces,
/// underscores and hyphens.
fn is_name_column(column: &str, hints: &[&str]) -> bool {
    let normalized: String = column
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    hints.contains(&normalized.as_str())
}

/// Generate suggestions with the default rules.
pub fn generate_suggestions(data: &Dataset) -> Vec<Suggestion> {
    SuggestionGenerator::new().generate(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn names(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.operation.name.as_str()).collect()
    }

    #[test]
    fn test_clean_data_has_no_suggestions() {
        let data = Dataset::new(vec![row! { "a" => 1, "b" => "x" }, row! { "a" => 2, "b" => "y" }]);
        assert!(generate_suggestions(&data).is_empty());
        assert!(generate_suggestions(&Dataset::empty()).is_empty());
    }

    #[test]
    fn test_duplicates_come_first() {
        let data = Dataset::new(vec![
            row! { "a" => 1, "b" => " x" },
            row! { "a" => 1, "b" => " x" },
            row! { "a" => 2, "b" => "y" },
        ]);
        let suggestions = generate_suggestions(&data);
        assert_eq!(names(&suggestions), vec!["removeDuplicates", "trimWhitespace"]);
        assert_eq!(suggestions[0].confidence, 95);
        assert_eq!(suggestions[0].affected_rows, 1);
        assert!(suggestions.iter().all(|s| s.is_pending()));
    }

    #[test]
    fn test_missing_value_buckets() {
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(row! {
                "id" => i,
                "mostly_empty" => if i < 15 { CellValue::Null } else { CellValue::from(i) },
                "score" => if i < 4 { CellValue::Null } else { CellValue::from(i * 10) },
                "note" => if i == 0 { CellValue::Null } else { CellValue::text(format!("n{}", i)) },
            });
        }
        let suggestions = generate_suggestions(&Dataset::new(rows));

        let remove = suggestions
            .iter()
            .find(|s| s.operation.name == "removeColumns")
            .unwrap();
        assert_eq!(remove.operation.params["columns"][0], "mostly_empty");

        let fill = suggestions
            .iter()
            .find(|s| s.operation.name == "fillMissingValues")
            .unwrap();
        assert_eq!(fill.operation.params["method"], "median");
        assert_eq!(fill.affected_rows, 4);

        let drop_rows = suggestions
            .iter()
            .find(|s| s.operation.name == "removeNullRows")
            .unwrap();
        assert_eq!(drop_rows.operation.params["columns"][0], "note");
    }

    #[test]
    fn test_inconsistent_type_converts_to_dominant() {
        let data = Dataset::new(vec![
            row! { "qty" => "1" },
            row! { "qty" => "2" },
            row! { "qty" => "three" },
        ]);
        let suggestions = generate_suggestions(&data);
        let convert = suggestions
            .iter()
            .find(|s| s.operation.name == "convertDataTypes")
            .unwrap();
        assert_eq!(convert.operation.params["conversions"]["qty"], "number");
        assert_eq!(convert.suggestion_type, SuggestionType::Validation);
        assert_eq!(convert.confidence, 85);
    }

    #[test]
    fn test_text_case_and_names() {
        let data = Dataset::new(vec![
            row! { "First Name" => "ada", "last_name" => "Lovelace", "city" => "paris" },
            row! { "First Name" => "alan", "last_name" => "Turing", "city" => "Paris" },
        ]);
        let suggestions = generate_suggestions(&data);
        let case = suggestions
            .iter()
            .find(|s| s.operation.name == "standardizeTextCase")
            .unwrap();
        assert_eq!(case.operation.params["columns"], serde_json::json!(["city"]));

        let merge = suggestions
            .iter()
            .find(|s| s.operation.name == "mergeColumns")
            .unwrap();
        assert_eq!(
            merge.operation.params["columns"],
            serde_json::json!(["First Name", "last_name"])
        );
        assert_eq!(merge.operation.params["newName"], "full_name");
    }

    #[test]
    fn test_date_format_suggestion() {
        let data = Dataset::new(vec![
            row! { "joined" => "01/15/2024", "iso" => "2024-01-15" },
            row! { "joined" => "2/3/2024", "iso" => "2024-02-03" },
        ]);
        let suggestions = generate_suggestions(&data);
        let dates = suggestions
            .iter()
            .find(|s| s.operation.name == "formatDates")
            .unwrap();
        assert_eq!(dates.operation.params["columns"], serde_json::json!(["joined"]));
        assert_eq!(dates.operation.params["format"], "YYYY-MM-DD");
    }

    #[test]
    fn test_every_suggestion_decodes() {
        let data = Dataset::new(vec![
            row! { "first" => "ada ", "last" => "L", "d" => "1/2/2024", "n" => "1" },
            row! { "first" => "ada ", "last" => "L", "d" => "1/2/2024", "n" => "1" },
            row! { "first" => "Ada", "last" => CellValue::Null, "d" => "3/4/2024", "n" => "x" },
        ]);
        let suggestions = generate_suggestions(&data);
        assert!(!suggestions.is_empty());
        for s in &suggestions {
            let op = s.operation.to_operation().unwrap();
            assert_eq!(op.name(), s.operation.name);
            assert!(op.apply(&data).is_ok());
        }
        let confidences: Vec<u8> = suggestions.iter().map(|s| s.confidence).collect();
        let mut sorted = confidences.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(confidences, sorted);
    }
}
