//! Small numeric helpers shared by the issue detector and cleaning operations.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::value::{CellValue, Dataset};

/// Numeric values of a column: non-empty cells that coerce to a finite number.
pub fn numeric_values(data: &Dataset, column: &str) -> Vec<f64> {
    data.column_values(column)
        .filter(|v| !v.is_empty())
        .filter_map(CellValue::numeric_value)
        .collect()
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median with the average of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent non-empty value. Ties go to the value seen first.
pub fn mode<'a, I>(values: I) -> Option<CellValue>
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut counts: IndexMap<String, (usize, &CellValue)> = IndexMap::new();
    for value in values.into_iter().filter(|v| !v.is_empty()) {
        counts
            .entry(value.to_json().to_string())
            .or_insert((0, value))
            .0 += 1;
    }

    let mut best: Option<(usize, &CellValue)> = None;
    for (count, value) in counts.values() {
        if best.is_none_or(|(best_count, _)| *count > best_count) {
            best = Some((*count, value));
        }
    }
    best.map(|(_, value)| value.clone())
}

/// First and third quartile by index (`floor(n * 0.25)`, `floor(n * 0.75)`)
/// on the sorted values, without interpolation.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let n = sorted.len();
    let q1 = sorted[(n as f64 * 0.25).floor() as usize];
    let q3 = sorted[((n as f64 * 0.75).floor() as usize).min(n - 1)];
    Some((q1, q3))
}

/// Lower and upper outlier fences: `Q1 - k·IQR` and `Q3 + k·IQR`.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let (q1, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Most decimal places an f64 can meaningfully hold.
const MAX_DECIMALS: u32 = 15;

/// Round to `decimals` places, with halves rounded towards positive infinity.
///
/// `decimals` is capped at 15. A value that would overflow while scaling is
/// returned unchanged, so the result is always finite for finite input.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let rounded = (value * factor + 0.5).floor() / factor;
    if rounded.is_finite() { rounded } else { value }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}
