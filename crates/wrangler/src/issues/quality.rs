//! Data quality score derived from an issue report.

use serde::{Deserialize, Serialize};

use crate::value::Dataset;

use super::detector::DataIssues;

/// Summary score for a dataset (0-100, higher is cleaner).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Overall score (0-100).
    pub score: f64,
    /// Share of non-empty cells (0-100).
    pub completeness: f64,
    /// Total cells considered (rows × columns).
    pub total_cells: usize,
    /// Null or empty cells.
    pub empty_cells: usize,
    /// Rows repeating an earlier row.
    pub duplicate_rows: usize,
    /// Columns with mixed value types.
    pub inconsistent_columns: usize,
    /// Columns with at least one outlier.
    pub outlier_columns: usize,
    /// Human-readable recommendation.
    pub recommendation: String,
}

impl QualityReport {
    /// Score a dataset from its issue report.
    ///
    /// Completeness is the base score. Duplicates cost up to 20 points in
    /// proportion to their share of rows; each inconsistent column costs 5
    /// and each outlier column 2. Total penalty is capped at 50.
    pub fn from_issues(data: &Dataset, issues: &DataIssues) -> Self {
        let rows = data.len();
        let columns = data.all_columns().len();
        let total_cells = rows * columns;
        let empty_cells = issues.total_nulls();

        if total_cells == 0 {
            return Self {
                score: 100.0,
                completeness: 100.0,
                recommendation: recommendation(100.0, issues),
                ..Self::default()
            };
        }

        let completeness = 100.0 * (1.0 - empty_cells as f64 / total_cells as f64);

        let duplicate_penalty = 20.0 * issues.duplicate_rows as f64 / rows as f64;
        let type_penalty = 5.0 * issues.inconsistent_types.len() as f64;
        let outlier_penalty = 2.0 * issues.outliers.len() as f64;
        let total_penalty = (duplicate_penalty + type_penalty + outlier_penalty).min(50.0);

        let score = (completeness - total_penalty).clamp(0.0, 100.0);

        Self {
            score,
            completeness,
            total_cells,
            empty_cells,
            duplicate_rows: issues.duplicate_rows,
            inconsistent_columns: issues.inconsistent_types.len(),
            outlier_columns: issues.outliers.len(),
            recommendation: recommendation(score, issues),
        }
    }
}

fn recommendation(score: f64, issues: &DataIssues) -> String {
    if issues.is_clean() {
        "No issues detected. Data looks clean.".to_string()
    } else if score >= 90.0 {
        "Data quality is good. Minor issues detected for review.".to_string()
    } else if score >= 70.0 {
        "Data quality is acceptable. Consider applying the suggested fixes.".to_string()
    } else {
        format!(
            "Data quality needs attention (score: {:.0}). Review missing values and duplicates first.",
            score
        )
    }
}
