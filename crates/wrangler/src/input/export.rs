//! CSV and JSON export.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WranglerError};
use crate::value::Dataset;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        extension.parse()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = WranglerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(WranglerError::UnsupportedFormat(format!(
                "cannot export as '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize a dataset as CSV.
///
/// The header is the union of all row keys in first-seen order. Nulls are
/// written as empty fields; fields are quoted only when they need it.
pub fn to_csv(data: &Dataset) -> Result<String> {
    let columns = data.all_columns();
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for row in data {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| WranglerError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serialize a dataset as a pretty-printed JSON array.
pub fn to_json(data: &Dataset) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Serialize in the given format.
pub fn export(data: &Dataset, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv(data),
        ExportFormat::Json => to_json(data),
    }
}

/// Write a dataset to a file.
pub fn export_to_path(data: &Dataset, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    let contents = export(data, format)?;
    fs::write(path, contents).map_err(|e| WranglerError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), %format, rows = data.len(), "exported data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_csv;
    use crate::row;
    use crate::value::CellValue;

    #[test]
    fn test_to_csv_quotes_commas() {
        let data = Dataset::new(vec![
            row! { "name" => "Smith, J", "n" => 1.5, "ok" => true },
            row! { "name" => "Lee", "n" => CellValue::Null, "ok" => false },
        ]);
        let csv = to_csv(&data).unwrap();
        assert_eq!(csv, "name,n,ok\n\"Smith, J\",1.5,true\nLee,,false\n");
    }

    #[test]
    fn test_csv_round_trip() {
        let data = Dataset::new(vec![
            row! { "a" => 1, "b" => "x", "c" => true },
            row! { "a" => 2.5, "b" => "y z", "c" => CellValue::Null },
        ]);
        let back = parse_csv(&to_csv(&data).unwrap()).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_to_json_is_pretty_array() {
        let data = Dataset::new(vec![row! { "a" => 1 }]);
        let json = to_json(&data).unwrap();
        assert!(json.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["a"], 1);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")).unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_path(Path::new("out.xlsx")).is_err());
        assert!(ExportFormat::from_path(Path::new("out")).is_err());
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = Dataset::new(vec![row! { "a" => 1 }]);
        export_to_path(&data, &path, ExportFormat::Csv).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n1\n");
    }
}
