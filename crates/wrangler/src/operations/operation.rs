//! The closed set of named operations.
//!
//! Every cleaning and transformation function has exactly one [`Operation`]
//! variant. Operations serialize as `{"name": "...", "params": {...}}` with
//! camelCase names, so recipes and suggestions can be stored as JSON and
//! decoded back into typed calls.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WranglerError};
use crate::value::{CellValue, ColumnType, Dataset};

use super::cleaning::{self, FillMethod, TextCase};
use super::formula::Formula;
use super::transform::{self, Filter, RoundConfig, SortDirection, SortKey};

/// Default IQR multiplier for `removeOutliers`.
pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 1.5;

/// Whether an operation cleans values or reshapes the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Clean,
    Transform,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Clean => "clean",
            OperationKind::Transform => "transform",
        }
    }
}

/// A named operation with typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "name",
    content = "params",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    // Cleaning
    RemoveDuplicates {
        keys: Option<Vec<String>>,
    },
    TrimWhitespace {
        columns: Option<Vec<String>>,
    },
    RemoveNullRows {
        columns: Option<Vec<String>>,
    },
    DropEmptyColumns {},
    RemoveColumns {
        columns: Vec<String>,
    },
    FillMissingValues {
        columns: Vec<String>,
        method: FillMethod,
        value: Option<CellValue>,
    },
    StandardizeTextCase {
        columns: Vec<String>,
        case_type: TextCase,
    },
    RemoveSpecialCharacters {
        columns: Vec<String>,
        pattern: Option<String>,
    },
    FindAndReplace {
        columns: Vec<String>,
        find: String,
        #[serde(default)]
        replace: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    RemoveOutliers {
        columns: Vec<String>,
        multiplier: Option<f64>,
    },

    // Transformation
    RenameColumns {
        mapping: IndexMap<String, String>,
    },
    ReorderColumns {
        order: Vec<String>,
    },
    SplitColumn {
        column: String,
        delimiter: String,
        new_names: Vec<String>,
        #[serde(default)]
        keep_original: bool,
    },
    MergeColumns {
        columns: Vec<String>,
        new_name: String,
        #[serde(default)]
        delimiter: String,
        #[serde(default)]
        keep_originals: bool,
    },
    CreateCalculatedColumn {
        new_name: String,
        formula: Formula,
    },
    SortData {
        sort_columns: Vec<SortKey>,
    },
    FilterData {
        filters: Vec<Filter>,
    },
    RoundValues {
        configs: Vec<RoundConfig>,
    },
    ConvertDataTypes {
        conversions: IndexMap<String, ColumnType>,
    },
    FormatDates {
        columns: Vec<String>,
        format: String,
    },
    BinValues {
        column: String,
        bins: Vec<f64>,
        labels: Option<Vec<String>>,
        new_column_name: String,
    },
    ExtractPattern {
        column: String,
        pattern: String,
        new_column_name: String,
        group: Option<usize>,
    },
}

impl Operation {
    /// Every operation name, in declaration order.
    pub const NAMES: &'static [&'static str] = &[
        "removeDuplicates",
        "trimWhitespace",
        "removeNullRows",
        "dropEmptyColumns",
        "removeColumns",
        "fillMissingValues",
        "standardizeTextCase",
        "removeSpecialCharacters",
        "findAndReplace",
        "removeOutliers",
        "renameColumns",
        "reorderColumns",
        "splitColumn",
        "mergeColumns",
        "createCalculatedColumn",
        "sortData",
        "filterData",
        "roundValues",
        "convertDataTypes",
        "formatDates",
        "binValues",
        "extractPattern",
    ];

    /// Decode an operation from its name and parameter object.
    ///
    /// A `null` params value is treated as `{}`. Names outside [`Self::NAMES`]
    /// fail with [`WranglerError::UnknownOperation`]; bad parameters fail with
    /// [`WranglerError::InvalidParameters`].
    pub fn from_name_and_params(name: &str, params: &Value) -> Result<Self> {
        if !Self::NAMES.contains(&name) {
            return Err(WranglerError::UnknownOperation(name.to_string()));
        }
        let params = match params {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        let mut tagged = Map::new();
        tagged.insert("name".to_string(), Value::String(name.to_string()));
        tagged.insert("params".to_string(), params);
        serde_json::from_value(Value::Object(tagged))
            .map_err(|e| WranglerError::invalid_params(name, e.to_string()))
    }

    /// The camelCase operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RemoveDuplicates { .. } => "removeDuplicates",
            Operation::TrimWhitespace { .. } => "trimWhitespace",
            Operation::RemoveNullRows { .. } => "removeNullRows",
            Operation::DropEmptyColumns {} => "dropEmptyColumns",
            Operation::RemoveColumns { .. } => "removeColumns",
            Operation::FillMissingValues { .. } => "fillMissingValues",
            Operation::StandardizeTextCase { .. } => "standardizeTextCase",
            Operation::RemoveSpecialCharacters { .. } => "removeSpecialCharacters",
            Operation::FindAndReplace { .. } => "findAndReplace",
            Operation::RemoveOutliers { .. } => "removeOutliers",
            Operation::RenameColumns { .. } => "renameColumns",
            Operation::ReorderColumns { .. } => "reorderColumns",
            Operation::SplitColumn { .. } => "splitColumn",
            Operation::MergeColumns { .. } => "mergeColumns",
            Operation::CreateCalculatedColumn { .. } => "createCalculatedColumn",
            Operation::SortData { .. } => "sortData",
            Operation::FilterData { .. } => "filterData",
            Operation::RoundValues { .. } => "roundValues",
            Operation::ConvertDataTypes { .. } => "convertDataTypes",
            Operation::FormatDates { .. } => "formatDates",
            Operation::BinValues { .. } => "binValues",
            Operation::ExtractPattern { .. } => "extractPattern",
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::RemoveDuplicates { .. }
            | Operation::TrimWhitespace { .. }
            | Operation::RemoveNullRows { .. }
            | Operation::DropEmptyColumns {}
            | Operation::RemoveColumns { .. }
            | Operation::FillMissingValues { .. }
            | Operation::StandardizeTextCase { .. }
            | Operation::RemoveSpecialCharacters { .. }
            | Operation::FindAndReplace { .. }
            | Operation::RemoveOutliers { .. } => OperationKind::Clean,
            _ => OperationKind::Transform,
        }
    }

    /// The parameter object as it would appear in a recipe.
    pub fn params(&self) -> Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut("params").map(Value::take))
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Run the operation against a dataset.
    pub fn apply(&self, data: &Dataset) -> Result<Dataset> {
        let out = match self {
            Operation::RemoveDuplicates { keys } => {
                cleaning::remove_duplicates(data, keys.as_deref())
            }
            Operation::TrimWhitespace { columns } => {
                cleaning::trim_whitespace(data, columns.as_deref())
            }
            Operation::RemoveNullRows { columns } => {
                cleaning::remove_null_rows(data, columns.as_deref())
            }
            Operation::DropEmptyColumns {} => cleaning::drop_empty_columns(data),
            Operation::RemoveColumns { columns } => cleaning::remove_columns(data, columns),
            Operation::FillMissingValues {
                columns,
                method,
                value,
            } => {
                if *method == FillMethod::Value && value.is_none() {
                    return Err(WranglerError::invalid_params(
                        self.name(),
                        "method 'value' requires a value",
                    ));
                }
                cleaning::fill_missing_values(data, columns, *method, value.as_ref())
            }
            Operation::StandardizeTextCase { columns, case_type } => {
                cleaning::standardize_text_case(data, columns, *case_type)
            }
            Operation::RemoveSpecialCharacters { columns, pattern } => {
                cleaning::remove_special_characters(data, columns, pattern.as_deref())?
            }
            Operation::FindAndReplace {
                columns,
                find,
                replace,
                case_sensitive,
            } => cleaning::find_and_replace(data, columns, find, replace, *case_sensitive)?,
            Operation::RemoveOutliers {
                columns,
                multiplier,
            } => cleaning::remove_outliers(
                data,
                columns,
                multiplier.unwrap_or(DEFAULT_OUTLIER_MULTIPLIER),
            ),
            Operation::RenameColumns { mapping } => transform::rename_columns(data, mapping),
            Operation::ReorderColumns { order } => transform::reorder_columns(data, order),
            Operation::SplitColumn {
                column,
                delimiter,
                new_names,
                keep_original,
            } => transform::split_column(data, column, delimiter, new_names, *keep_original),
            Operation::MergeColumns {
                columns,
                new_name,
                delimiter,
                keep_originals,
            } => transform::merge_columns(data, columns, new_name, delimiter, *keep_originals),
            Operation::CreateCalculatedColumn { new_name, formula } => {
                transform::create_calculated_column(data, new_name, |row| formula.evaluate(row))
            }
            Operation::SortData { sort_columns } => transform::sort_data(data, sort_columns),
            Operation::FilterData { filters } => transform::filter_data(data, filters),
            Operation::RoundValues { configs } => transform::round_values(data, configs),
            Operation::ConvertDataTypes { conversions } => {
                transform::convert_data_types(data, conversions)
            }
            Operation::FormatDates { columns, format } => {
                transform::format_dates(data, columns, format)
            }
            Operation::BinValues {
                column,
                bins,
                labels,
                new_column_name,
            } => transform::bin_values(data, column, bins, labels.as_deref(), new_column_name),
            Operation::ExtractPattern {
                column,
                pattern,
                new_column_name,
                group,
            } => transform::extract_pattern(data, column, pattern, new_column_name, *group)?,
        };
        Ok(out)
    }

    /// Short human-readable summary.
    pub fn description(&self) -> String {
        match self {
            Operation::RemoveDuplicates { keys: Some(keys) } if !keys.is_empty() => {
                format!("Remove duplicate rows by {}", keys.join(", "))
            }
            Operation::RemoveDuplicates { .. } => "Remove duplicate rows".to_string(),
            Operation::TrimWhitespace { columns } => {
                format!("Trim whitespace in {}", column_list(columns.as_deref()))
            }
            Operation::RemoveNullRows { columns } => {
                format!("Remove rows with empty {}", column_list(columns.as_deref()))
            }
            Operation::DropEmptyColumns {} => "Drop empty columns".to_string(),
            Operation::RemoveColumns { columns } => {
                format!("Remove columns {}", columns.join(", "))
            }
            Operation::FillMissingValues { columns, method, value } => match (method, value) {
                (FillMethod::Value, Some(v)) => {
                    format!("Fill missing {} with '{}'", columns.join(", "), v)
                }
                _ => format!(
                    "Fill missing {} with {}",
                    columns.join(", "),
                    fill_method_label(*method)
                ),
            },
            Operation::StandardizeTextCase { columns, case_type } => format!(
                "Convert {} to {}",
                columns.join(", "),
                text_case_label(*case_type)
            ),
            Operation::RemoveSpecialCharacters { columns, .. } => {
                format!("Remove special characters from {}", columns.join(", "))
            }
            Operation::FindAndReplace {
                columns,
                find,
                replace,
                ..
            } => format!(
                "Replace '{}' with '{}' in {}",
                find,
                replace,
                columns.join(", ")
            ),
            Operation::RemoveOutliers { columns, .. } => {
                format!("Remove outlier rows in {}", columns.join(", "))
            }
            Operation::RenameColumns { mapping } => {
                let pairs: Vec<String> = mapping
                    .iter()
                    .take(3)
                    .map(|(from, to)| format!("'{}' → '{}'", from, to))
                    .collect();
                format!("Rename {}", pairs.join(", "))
            }
            Operation::ReorderColumns { .. } => "Reorder columns".to_string(),
            Operation::SplitColumn {
                column, new_names, ..
            } => format!("Split '{}' into {}", column, new_names.join(", ")),
            Operation::MergeColumns {
                columns, new_name, ..
            } => format!("Merge {} into '{}'", columns.join(", "), new_name),
            Operation::CreateCalculatedColumn { new_name, formula } => {
                format!("Create '{}' = {}", new_name, formula)
            }
            Operation::SortData { sort_columns } => {
                let keys: Vec<String> = sort_columns
                    .iter()
                    .map(|k| match k.direction {
                        SortDirection::Asc => format!("{} asc", k.column),
                        SortDirection::Desc => format!("{} desc", k.column),
                    })
                    .collect();
                format!("Sort by {}", keys.join(", "))
            }
            Operation::FilterData { filters } => format!("Filter rows ({} conditions)", filters.len()),
            Operation::RoundValues { configs } => {
                let columns: Vec<&str> = configs.iter().map(|c| c.column.as_str()).collect();
                format!("Round {}", columns.join(", "))
            }
            Operation::ConvertDataTypes { conversions } => {
                let pairs: Vec<String> = conversions
                    .iter()
                    .map(|(c, t)| format!("{} → {}", c, t.label()))
                    .collect();
                format!("Convert {}", pairs.join(", "))
            }
            Operation::FormatDates { columns, format } => {
                format!("Format dates in {} as {}", columns.join(", "), format)
            }
            Operation::BinValues {
                column,
                new_column_name,
                ..
            } => format!("Bin '{}' into '{}'", column, new_column_name),
            Operation::ExtractPattern {
                column,
                new_column_name,
                ..
            } => format!("Extract from '{}' into '{}'", column, new_column_name),
        }
    }
}

fn column_list(columns: Option<&[String]>) -> String {
    match columns {
        Some(columns) if !columns.is_empty() => columns.join(", "),
        _ => "all columns".to_string(),
    }
}

fn fill_method_label(method: FillMethod) -> &'static str {
    match method {
        FillMethod::Value => "a value",
        FillMethod::Mean => "mean",
        FillMethod::Median => "median",
        FillMethod::Mode => "mode",
    }
}

fn text_case_label(case: TextCase) -> &'static str {
    match case {
        TextCase::Uppercase => "uppercase",
        TextCase::Lowercase => "lowercase",
        TextCase::Titlecase => "title case",
    }
}

/// Loosely typed `{name, params}` pair, as stored in recipes.
#[derive(Debug, Clone, Deserialize)]
struct RecipeStep {
    name: String,
    #[serde(default)]
    params: Value,
}

/// Decode a JSON recipe: an array of `{"name": ..., "params": ...}` objects.
pub fn parse_recipe(json: &str) -> Result<Vec<Operation>> {
    let steps: Vec<RecipeStep> = serde_json::from_str(json)?;
    steps
        .iter()
        .map(|step| Operation::from_name_and_params(&step.name, &step.params))
        .collect()
}
