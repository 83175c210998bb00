//! Column type inference from sample values.

use indexmap::IndexMap;

use crate::value::{is_boolean_literal, parse_date, CellValue, ColumnDescriptor, ColumnType, Dataset};

/// Default number of rows sampled per column.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Classify a column from sample values.
///
/// Empty cells are ignored. Checks run in a fixed priority order so plain
/// numbers are never mistaken for timestamps:
///
/// 1. no non-empty sample → `Unknown`
/// 2. every value is a finite number or numeric text → `Number`
/// 3. every value is a boolean or `true`/`false` text → `Boolean`
/// 4. every value is a date, or date text longer than five characters → `Date`
/// 5. otherwise `String`
pub fn infer_type<'a, I>(samples: I) -> ColumnType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let values: Vec<&CellValue> = samples.into_iter().filter(|v| !v.is_empty()).collect();

    if values.is_empty() {
        return ColumnType::Unknown;
    }

    if values.iter().all(|v| v.numeric_value().is_some()) {
        return ColumnType::Number;
    }

    if values.iter().all(|v| match v {
        CellValue::Bool(_) => true,
        CellValue::String(s) => is_boolean_literal(s),
        _ => false,
    }) {
        return ColumnType::Boolean;
    }

    if values.iter().all(|v| match v {
        CellValue::Date(_) => true,
        CellValue::String(s) => s.len() > 5 && parse_date(s).is_some(),
        _ => false,
    }) {
        return ColumnType::Date;
    }

    ColumnType::String
}

/// Infer the type of every column named in `columns` from the first
/// `sample_size` rows.
pub fn infer_column_types(
    data: &Dataset,
    columns: &[String],
    sample_size: usize,
) -> IndexMap<String, ColumnType> {
    columns
        .iter()
        .map(|column| {
            let sample = data
                .rows()
                .iter()
                .take(sample_size)
                .filter_map(|row| row.get(column));
            (column.clone(), infer_type(sample))
        })
        .collect()
}

/// Describe the columns of the first row with their inferred types.
pub fn describe_columns(data: &Dataset, sample_size: usize) -> Vec<ColumnDescriptor> {
    infer_column_types(data, &data.columns(), sample_size)
        .into_iter()
        .map(|(name, inferred_type)| ColumnDescriptor::new(name, inferred_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn cells(values: &[CellValue]) -> ColumnType {
        infer_type(values.iter())
    }

    #[test]
    fn test_empty_sample_is_unknown() {
        assert_eq!(cells(&[]), ColumnType::Unknown);
        assert_eq!(cells(&[CellValue::Null, CellValue::text("")]), ColumnType::Unknown);
    }

    #[test]
    fn test_numbers_before_dates() {
        let values = [CellValue::text("2024"), CellValue::text("1999"), CellValue::Number(3.0)];
        assert_eq!(cells(&values), ColumnType::Number);
    }

    #[test]
    fn test_boolean_text() {
        let values = [CellValue::text("TRUE"), CellValue::text("false"), CellValue::Bool(true)];
        assert_eq!(cells(&values), ColumnType::Boolean);
    }

    #[test]
    fn test_booleans_are_not_numbers() {
        assert_eq!(cells(&[CellValue::Bool(true), CellValue::Bool(false)]), ColumnType::Boolean);
    }

    #[test]
    fn test_dates_need_more_than_five_chars() {
        let values = [CellValue::text("2024-01-15"), CellValue::text("2024-02-20")];
        assert_eq!(cells(&values), ColumnType::Date);
        assert_eq!(cells(&[CellValue::text("1/2")]), ColumnType::String);
    }

    #[test]
    fn test_mixed_falls_back_to_string() {
        let values = [CellValue::Number(1.0), CellValue::text("abc")];
        assert_eq!(cells(&values), ColumnType::String);
    }

    #[test]
    fn test_infer_column_types_samples_rows() {
        let data = Dataset::new(vec![
            row! { "n" => 1, "s" => "a" },
            row! { "n" => 2, "s" => "b" },
        ]);
        let types = infer_column_types(&data, &data.columns(), 100);
        assert_eq!(types["n"], ColumnType::Number);
        assert_eq!(types["s"], ColumnType::String);
    }
}
