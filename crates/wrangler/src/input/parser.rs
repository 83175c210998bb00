//! CSV and JSON import.
//!
//! CSV input needs a header row. Each cell is coerced on the way in: empty,
//! `null` and `na` become null, `true`/`false` become booleans, numeric text
//! becomes a number and everything else stays a string. JSON input is an
//! array of objects or a single object.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, WranglerError};
use crate::value::{is_boolean_literal, parse_number, CellValue, Dataset, Row};

use super::source::{delimiter_format, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses CSV-family and JSON data into datasets.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read and parse a file.
    ///
    /// `.json` files are parsed as JSON and everything else as delimited
    /// text, unless the contents start with `[` or `{`.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| WranglerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let is_json = match extension.as_str() {
            "json" => true,
            "csv" | "tsv" | "txt" | "psv" => false,
            _ => looks_like_json(&contents),
        };

        let (data, metadata) = if is_json {
            self.parse_json_bytes(&contents)?
        } else {
            self.parse_csv_bytes(&contents)?
        };
        let metadata = metadata.with_path(path);

        info!(
            file = %metadata.file,
            format = %metadata.format,
            rows = metadata.row_count,
            columns = metadata.column_count,
            "imported data"
        );
        Ok((data, metadata))
    }

    /// Parse delimited text.
    pub fn parse_csv(&self, text: &str) -> Result<Dataset> {
        self.parse_csv_bytes(text.as_bytes()).map(|(data, _)| data)
    }

    /// Parse JSON text.
    pub fn parse_json(&self, text: &str) -> Result<Dataset> {
        self.parse_json_bytes(text.as_bytes()).map(|(data, _)| data)
    }

    /// Parse delimited bytes, detecting the delimiter unless configured.
    pub fn parse_csv_bytes(&self, bytes: &[u8]) -> Result<(Dataset, SourceMetadata)> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        debug!(delimiter = %(delimiter as char).escape_default(), "parsing delimited data");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(WranglerError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }

            let record = result?;
            let row: Row = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let cell = record.get(i).map(coerce_csv_cell).unwrap_or(CellValue::Null);
                    (header.clone(), cell)
                })
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(WranglerError::EmptyData("No data rows found".to_string()));
        }

        let metadata = SourceMetadata::new(
            "input",
            bytes,
            delimiter_format(delimiter),
            rows.len(),
            headers.len(),
        );
        Ok((Dataset::new(rows), metadata))
    }

    /// Parse JSON bytes: an array of objects or one object.
    pub fn parse_json_bytes(&self, bytes: &[u8]) -> Result<(Dataset, SourceMetadata)> {
        let value: Value = serde_json::from_slice(bytes)?;
        let mut values = match value {
            Value::Array(items) => items,
            Value::Object(map) => vec![Value::Object(map)],
            other => {
                return Err(WranglerError::UnsupportedFormat(format!(
                    "expected an array of objects, found {}",
                    json_kind(&other)
                )));
            }
        };
        if let Some(max) = self.config.max_rows {
            values.truncate(max);
        }
        if values.is_empty() {
            return Err(WranglerError::EmptyData("JSON array is empty".to_string()));
        }

        let data = Dataset::from_json_rows(&values).ok_or_else(|| {
            WranglerError::UnsupportedFormat("every JSON array item must be an object".to_string())
        })?;

        let metadata =
            SourceMetadata::new("input", bytes, "json", data.len(), data.all_columns().len());
        Ok((data, metadata))
    }
}

/// Coerce one raw CSV field.
pub fn coerce_csv_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("na")
    {
        return CellValue::Null;
    }
    if is_boolean_literal(trimmed) {
        return CellValue::Bool(trimmed.eq_ignore_ascii_case("true"));
    }
    if let Some(n) = parse_number(trimmed) {
        return CellValue::Number(n);
    }
    CellValue::String(raw.to_string())
}

/// Parse CSV text with the default parser.
pub fn parse_csv(text: &str) -> Result<Dataset> {
    Parser::new().parse_csv(text)
}

/// Parse JSON text with the default parser.
pub fn parse_json(text: &str) -> Result<Dataset> {
    Parser::new().parse_json(text)
}

fn looks_like_json(bytes: &[u8]) -> bool {
    matches!(
        bytes.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'[') | Some(b'{')
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Detect the delimiter from the first lines.
///
/// A delimiter that appears the same number of times on every line wins;
/// ties go to the higher count, then to the earlier entry of [`DELIMITERS`].
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(WranglerError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delimiter in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delimiter))
            .collect();

        let first = counts[0];
        if first == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first);
        let score = if consistent { first * 1000 } else { first };

        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, ignoring quoted sections.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delimiter = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
