//! Main Wrangler struct and public API.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{DataEngine, EngineConfig};
use crate::error::Result;
use crate::input::{self, ExportFormat, Parser, ParserConfig, SourceMetadata};
use crate::issues::{DataIssues, QualityReport};
use crate::operations::{parse_recipe, Operation};
use crate::suggestion::{Suggestion, SuggestionConfig, SuggestionGenerator, SuggestionTracker};
use crate::value::{ColumnDescriptor, Dataset};

/// Configuration for a Wrangler session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WranglerConfig {
    /// Import settings.
    pub parser: ParserConfig,
    /// Engine settings.
    pub engine: EngineConfig,
    /// Suggestion rule thresholds.
    pub suggestions: SuggestionConfig,
}

/// Snapshot of the current dataset's health.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Metadata about the imported source, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// Number of rows in the current dataset.
    pub row_count: usize,
    /// Columns with their inferred types.
    pub columns: Vec<ColumnDescriptor>,
    /// Detected issues.
    pub issues: DataIssues,
    /// Quality score.
    pub quality: QualityReport,
    /// Suggestions not yet applied or dismissed.
    pub suggestions: Vec<Suggestion>,
}

/// A data-wrangling session: import, analyze, transform, export.
///
/// Owns one [`DataEngine`]. Pass the session (or the engine) to whatever
/// needs it; there is no global state.
#[derive(Debug, Clone)]
pub struct Wrangler {
    config: WranglerConfig,
    parser: Parser,
    engine: DataEngine,
    generator: SuggestionGenerator,
    tracker: SuggestionTracker,
    source: Option<SourceMetadata>,
}

impl Wrangler {
    /// Create a session with default configuration.
    pub fn new() -> Self {
        Self {
            config: WranglerConfig::default(),
            parser: Parser::new(),
            engine: DataEngine::new(),
            generator: SuggestionGenerator::new(),
            tracker: SuggestionTracker::new(),
            source: None,
        }
    }

    /// Create a session with custom configuration.
    pub fn with_config(config: WranglerConfig) -> Result<Self> {
        Ok(Self {
            parser: Parser::with_config(config.parser.clone()),
            engine: DataEngine::with_config(config.engine.clone())?,
            generator: SuggestionGenerator::with_config(config.suggestions.clone()),
            tracker: SuggestionTracker::new(),
            source: None,
            config,
        })
    }

    pub fn config(&self) -> &WranglerConfig {
        &self.config
    }

    /// Import a CSV or JSON file. On failure the session is unchanged.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<&SourceMetadata> {
        let (data, metadata) = self.parser.parse_file(path)?;
        Ok(self.start_session(data, Some(metadata)))
    }

    /// Import CSV text. On failure the session is unchanged.
    pub fn import_csv(&mut self, text: &str) -> Result<&SourceMetadata> {
        let (data, metadata) = self.parser.parse_csv_bytes(text.as_bytes())?;
        Ok(self.start_session(data, Some(metadata)))
    }

    /// Import JSON text. On failure the session is unchanged.
    pub fn import_json(&mut self, text: &str) -> Result<&SourceMetadata> {
        let (data, metadata) = self.parser.parse_json_bytes(text.as_bytes())?;
        Ok(self.start_session(data, Some(metadata)))
    }

    /// Start a session from an in-memory dataset.
    pub fn load(&mut self, data: Dataset) {
        self.start_session(data, None);
    }

    fn start_session(&mut self, data: Dataset, source: Option<SourceMetadata>) -> &SourceMetadata {
        self.engine.initialize_data(data);
        self.tracker.clear();
        let source = source.unwrap_or_else(|| {
            let json = serde_json::to_vec(self.engine.data()).unwrap_or_default();
            SourceMetadata::new(
                "memory",
                &json,
                "json",
                self.engine.data().len(),
                self.engine.columns().len(),
            )
        });
        self.source.insert(source)
    }

    pub fn engine(&self) -> &DataEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DataEngine {
        &mut self.engine
    }

    /// Current dataset.
    pub fn data(&self) -> &Dataset {
        self.engine.data()
    }

    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    pub fn tracker(&self) -> &SuggestionTracker {
        &self.tracker
    }

    /// Report issues, quality and pending suggestions for the current data.
    pub fn analyze(&mut self) -> AnalysisResult {
        let suggestions = self.suggestions();
        AnalysisResult {
            source: self.source.clone(),
            row_count: self.engine.data().len(),
            columns: self.engine.column_descriptors(),
            issues: self.engine.issues().clone(),
            quality: self.engine.quality().clone(),
            suggestions,
        }
    }

    /// Generate suggestions, hiding those already applied or dismissed.
    pub fn suggestions(&mut self) -> Vec<Suggestion> {
        let generated = self
            .generator
            .generate_with_issues(self.engine.data(), self.engine.issues());
        self.tracker.filter_new(generated)
    }

    /// Apply a suggestion's operation and mark it applied.
    ///
    /// Unknown operation names fail with `UnknownOperation` and leave the
    /// engine untouched.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> Result<()> {
        let operation = suggestion.operation.to_operation()?;
        self.engine.apply(operation)?;
        self.tracker.mark_applied(&suggestion.id);
        info!(id = %suggestion.id, title = %suggestion.title, "applied suggestion");
        Ok(())
    }

    /// Dismiss a suggestion so later runs hide it.
    pub fn dismiss_suggestion(&mut self, id: &str) -> bool {
        self.tracker.dismiss(id)
    }

    /// Apply one operation.
    pub fn apply(&mut self, operation: Operation) -> Result<()> {
        self.engine.apply(operation).map(|_| ())
    }

    /// Decode and apply a JSON recipe. Returns the number of operations
    /// applied. Nothing is applied if the recipe does not decode.
    pub fn apply_recipe(&mut self, json: &str) -> Result<usize> {
        let operations = parse_recipe(json)?;
        self.engine.apply_all(operations)
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.engine.undo()
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.engine.redo()
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Serialize the current dataset.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        input::export(self.engine.data(), format)
    }

    /// Write the current dataset to `path`, picking the format from the
    /// extension unless one is given.
    pub fn export_to_path(&self, path: impl AsRef<Path>, format: Option<ExportFormat>) -> Result<()> {
        let path = path.as_ref();
        let format = match format {
            Some(f) => f,
            None => ExportFormat::from_path(path)?,
        };
        input::export_to_path(self.engine.data(), path, format)
    }
}

impl Default for Wrangler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WranglerError;
    use crate::suggestion::{SuggestedOperation, SuggestionStatus, SuggestionType};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_import_and_analyze() {
        let file = create_test_file("id,name\n1,Ada\n1,Ada\n2, Bob\n", ".csv");
        let mut wrangler = Wrangler::new();
        let source = wrangler.import_file(file.path()).unwrap();
        assert_eq!(source.row_count, 3);
        assert_eq!(source.format, "csv");

        let result = wrangler.analyze();
        assert_eq!(result.row_count, 3);
        assert_eq!(result.columns.len(), 2);
        assert_eq!(result.issues.duplicate_rows, 1);
        assert!(result.quality.score < 100.0);
        assert_eq!(result.suggestions[0].operation.name, "removeDuplicates");
    }

    #[test]
    fn test_failed_import_keeps_session() {
        let mut wrangler = Wrangler::new();
        wrangler.import_csv("a\n1\n").unwrap();
        assert!(wrangler.import_json("[]").is_err());
        assert!(wrangler.import_file("/definitely/not/here.csv").is_err());
        assert_eq!(wrangler.data().len(), 1);
    }

    #[test]
    fn test_apply_suggestion_hides_it() {
        let mut wrangler = Wrangler::new();
        wrangler.import_csv("a,b\n1,x\n1,x\n2,y\n").unwrap();

        let first = wrangler.suggestions();
        let dedupe = first
            .iter()
            .find(|s| s.operation.name == "removeDuplicates")
            .unwrap()
            .clone();
        wrangler.apply_suggestion(&dedupe).unwrap();
        assert_eq!(wrangler.data().len(), 2);
        assert_eq!(
            wrangler.tracker().status(&dedupe.id),
            Some(SuggestionStatus::Applied)
        );

        wrangler.undo().unwrap();
        let again = wrangler.suggestions();
        assert!(again.iter().all(|s| s.id != dedupe.id));
    }

    #[test]
    fn test_unknown_suggestion_operation() {
        let mut wrangler = Wrangler::new();
        wrangler.import_csv("a\n1\n").unwrap();
        let mut suggestion = Suggestion::new(
            SuggestionType::Cleaning,
            "Bogus",
            &Operation::DropEmptyColumns {},
        );
        suggestion.operation = SuggestedOperation::new("teleportRows", serde_json::Value::Null);

        let err = wrangler.apply_suggestion(&suggestion).unwrap_err();
        assert!(matches!(err, WranglerError::UnknownOperation(_)));
        assert!(!wrangler.engine().can_undo());
    }

    #[test]
    fn test_recipe_and_export() {
        let mut wrangler = Wrangler::new();
        wrangler
            .import_json(r#"[{"a": 1, "b": "x "}, {"a": 1, "b": "x "}, {"a": 2, "b": "y"}]"#)
            .unwrap();
        let applied = wrangler
            .apply_recipe(
                r#"[{"name": "removeDuplicates"}, {"name": "trimWhitespace", "params": {"columns": ["b"]}}]"#,
            )
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(wrangler.export(ExportFormat::Csv).unwrap(), "a,b\n1,x\n2,y\n");

        let out = create_test_file("", ".json");
        wrangler.export_to_path(out.path(), None).unwrap();
        let written = std::fs::read_to_string(out.path()).unwrap();
        assert!(written.contains("\"b\": \"y\""));
    }

    #[test]
    fn test_bad_recipe_applies_nothing() {
        let mut wrangler = Wrangler::new();
        wrangler.import_csv("a\n1\n").unwrap();
        let result = wrangler.apply_recipe(r#"[{"name": "removeDuplicates"}, {"name": "nope"}]"#);
        assert!(result.is_err());
        assert!(!wrangler.engine().can_undo());
    }

    #[test]
    fn test_load_in_memory() {
        let mut wrangler = Wrangler::new();
        wrangler.load(Dataset::new(vec![crate::row! { "a" => 1 }]));
        assert_eq!(wrangler.source().map(|s| s.file.as_str()), Some("memory"));
        assert_eq!(wrangler.engine().columns(), ["a"]);
    }
}
