//! Single-pass scan for common data quality issues.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::inference::{iqr_bounds, infer_type, DEFAULT_SAMPLE_SIZE};
use crate::value::{row_fingerprint, ColumnType, Dataset};

/// Issues found in a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataIssues {
    /// Count of null/empty cells, for columns that have any.
    pub null_values: IndexMap<String, usize>,
    /// Number of rows that repeat an earlier row exactly.
    pub duplicate_rows: usize,
    /// Columns whose sampled values classify as more than one type.
    pub inconsistent_types: Vec<String>,
    /// Outlying values per numeric column, in row order.
    pub outliers: IndexMap<String, Vec<f64>>,
}

impl DataIssues {
    /// Returns true if nothing was found.
    pub fn is_clean(&self) -> bool {
        self.null_values.is_empty()
            && self.duplicate_rows == 0
            && self.inconsistent_types.is_empty()
            && self.outliers.is_empty()
    }

    /// Total null/empty cells across all columns.
    pub fn total_nulls(&self) -> usize {
        self.null_values.values().sum()
    }
}

/// Detects nulls, duplicates, mixed types and outliers.
#[derive(Debug, Clone)]
pub struct IssueDetector {
    /// Rows sampled per column for type checks.
    sample_size: usize,
    /// A column needs at least this many numeric values for outlier checks.
    min_outlier_values: usize,
    /// Maximum outliers reported per column.
    max_outliers: usize,
    /// Multiplier applied to the IQR for the outlier fences.
    iqr_multiplier: f64,
}

impl IssueDetector {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_outlier_values: 10,
            max_outliers: 100,
            iqr_multiplier: 1.5,
        }
    }

    /// Override the per-column sample size.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Multiplier used for the IQR fences.
    pub fn iqr_multiplier(&self) -> f64 {
        self.iqr_multiplier
    }

    /// Scan the dataset once and report its issues.
    pub fn detect(&self, data: &Dataset) -> DataIssues {
        let columns = data.all_columns();

        let mut issues = DataIssues {
            duplicate_rows: self.count_duplicates(data),
            ..DataIssues::default()
        };

        for column in &columns {
            let nulls = data.column_values(column).filter(|v| v.is_empty()).count();
            if nulls > 0 {
                issues.null_values.insert(column.clone(), nulls);
            }

            if self.has_inconsistent_types(data, column) {
                issues.inconsistent_types.push(column.clone());
            }

            let outliers = self.find_outliers(data, column);
            if !outliers.is_empty() {
                issues.outliers.insert(column.clone(), outliers);
            }
        }

        issues
    }

    /// Count rows whose serialized form repeats an earlier row.
    fn count_duplicates(&self, data: &Dataset) -> usize {
        let mut seen = HashSet::with_capacity(data.len());
        data.iter()
            .filter(|row| !seen.insert(row_fingerprint(row)))
            .count()
    }

    /// Classify up to `sample_size` non-empty values individually and report
    /// whether more than one refined type appears.
    fn has_inconsistent_types(&self, data: &Dataset, column: &str) -> bool {
        let types: IndexSet<ColumnType> = data
            .column_values(column)
            .filter(|v| !v.is_empty())
            .take(self.sample_size)
            .map(|v| v.refined_type())
            .collect();
        types.len() > 1
    }

    /// Values outside the IQR fences of a numeric column.
    fn find_outliers(&self, data: &Dataset, column: &str) -> Vec<f64> {
        let sample = data
            .rows()
            .iter()
            .take(self.sample_size)
            .filter_map(|row| row.get(column));
        if infer_type(sample) != ColumnType::Number {
            return Vec::new();
        }

        let values: Vec<f64> = crate::inference::numeric_values(data, column);
        if values.len() < self.min_outlier_values {
            return Vec::new();
        }

        let Some((lower, upper)) = iqr_bounds(&values, self.iqr_multiplier) else {
            return Vec::new();
        };

        values
            .into_iter()
            .filter(|v| *v < lower || *v > upper)
            .take(self.max_outliers)
            .collect()
    }
}

impl Default for IssueDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect issues with the default detector.
pub fn detect_issues(data: &Dataset) -> DataIssues {
    IssueDetector::new().detect(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::value::CellValue;

    #[test]
    fn test_null_counts() {
        let data = Dataset::new(vec![
            row! { "a" => CellValue::Null, "b" => "x" },
            row! { "a" => "", "b" => "y" },
            row! { "a" => 1, "b" => "z" },
        ]);
        let issues = detect_issues(&data);
        assert_eq!(issues.null_values.get("a"), Some(&2));
        assert!(!issues.null_values.contains_key("b"));
    }

    #[test]
    fn test_duplicate_count_is_total_repeats() {
        let data = Dataset::new(vec![
            row! { "a" => 1 },
            row! { "a" => 1 },
            row! { "a" => 1 },
            row! { "a" => 2 },
        ]);
        assert_eq!(detect_issues(&data).duplicate_rows, 2);
    }

    #[test]
    fn test_inconsistent_types() {
        let data = Dataset::new(vec![
            row! { "mixed" => 1, "clean" => "a" },
            row! { "mixed" => "hello", "clean" => "b" },
        ]);
        let issues = detect_issues(&data);
        assert_eq!(issues.inconsistent_types, vec!["mixed"]);
    }

    #[test]
    fn test_iqr_outliers() {
        let rows = [1, 2, 3, 4, 5, 6, 7, 8, 9, 100]
            .iter()
            .map(|v| row! { "v" => *v })
            .collect();
        let issues = detect_issues(&Dataset::new(rows));
        assert_eq!(issues.outliers.get("v"), Some(&vec![100.0]));
    }

    #[test]
    fn test_small_columns_skip_outliers() {
        let rows = [1, 2, 3, 4, 5, 6, 7, 8, 100]
            .iter()
            .map(|v| row! { "v" => *v })
            .collect();
        assert!(detect_issues(&Dataset::new(rows)).outliers.is_empty());
    }
}
