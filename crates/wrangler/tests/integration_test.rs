//! End-to-end tests for a Wrangler session: import, analyze, apply, export.

use std::io::Write;
use tempfile::NamedTempFile;

use wrangler::suggestion::SuggestionStatus;
use wrangler::{ColumnType, ExportFormat, Wrangler, WranglerConfig, WranglerError};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_import_basic_csv() {
    let content = "id,name,age,active\n\
                   1,Alice,30,true\n\
                   2,Bob,25,false\n\
                   3,Carol,28,true\n";
    let file = create_test_file(content, ".csv");

    let mut wrangler = Wrangler::new();
    let source = wrangler.import_file(file.path()).expect("Import failed");
    assert_eq!(source.row_count, 3);
    assert_eq!(source.column_count, 4);
    assert_eq!(source.format, "csv");
    assert!(source.hash.starts_with("sha256:"));

    let types = wrangler.engine().column_types();
    assert_eq!(types["id"], ColumnType::Number);
    assert_eq!(types["name"], ColumnType::String);
    assert_eq!(types["active"], ColumnType::Boolean);
}

#[test]
fn test_import_tsv_auto_detect() {
    let content = "sample\tdiagnosis\tage\n\
                   S001\tCD\t25\n\
                   S002\tUC\t31\n";
    let file = create_test_file(content, ".tsv");

    let mut wrangler = Wrangler::new();
    let source = wrangler.import_file(file.path()).unwrap();
    assert_eq!(source.format, "tsv");
    assert_eq!(wrangler.engine().columns(), ["sample", "diagnosis", "age"]);
}

#[test]
fn test_import_json_without_extension() {
    let file = create_test_file(r#"[{"city": "Oslo", "temp": 4.5}, {"city": "Lima", "temp": null}]"#, "");

    let mut wrangler = Wrangler::new();
    let source = wrangler.import_file(file.path()).unwrap();
    assert_eq!(source.format, "json");
    assert_eq!(wrangler.engine().issues().null_values["temp"], 1);
}

#[test]
fn test_import_errors() {
    let mut wrangler = Wrangler::new();

    let empty = create_test_file("a,b\n", ".csv");
    assert!(matches!(
        wrangler.import_file(empty.path()),
        Err(WranglerError::EmptyData(_))
    ));

    let scalar = create_test_file("42", ".json");
    assert!(matches!(
        wrangler.import_file(scalar.path()),
        Err(WranglerError::UnsupportedFormat(_))
    ));

    assert!(matches!(
        wrangler.import_file("/no/such/file.csv"),
        Err(WranglerError::Io { .. })
    ));
}

// =============================================================================
// Analysis and suggestions
// =============================================================================

#[test]
fn test_analysis_reports_issues() {
    let content = "name,score,city\n\
                   Alice,1,  Oslo\n\
                   Bob,2,Lima\n\
                   Carol,3,Lima\n\
                   Dan,4,Oslo\n\
                   Eve,5,Lima\n\
                   Fay,6,\n\
                   Gus,7,Oslo\n\
                   Hal,8,Lima\n\
                   Ida,9,Oslo\n\
                   Jo,100,Lima\n";
    let file = create_test_file(content, ".csv");

    let mut wrangler = Wrangler::new();
    wrangler.import_file(file.path()).unwrap();
    let result = wrangler.analyze();

    assert_eq!(result.issues.outliers["score"], vec![100.0]);
    assert_eq!(result.issues.null_values["city"], 1);
    assert_eq!(result.issues.duplicate_rows, 0);

    let names: Vec<&str> = result
        .suggestions
        .iter()
        .map(|s| s.operation.name.as_str())
        .collect();
    assert!(names.contains(&"removeOutliers"));
    assert!(names.contains(&"trimWhitespace"));

    let confidences: Vec<u8> = result.suggestions.iter().map(|s| s.confidence).collect();
    let mut sorted = confidences.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(confidences, sorted);
}

#[test]
fn test_dismissed_suggestions_stay_hidden() {
    let mut wrangler = Wrangler::new();
    wrangler.import_csv("a,b\n1, x\n1, x\n").unwrap();

    let suggestions = wrangler.suggestions();
    let first = suggestions[0].clone();
    assert!(wrangler.dismiss_suggestion(&first.id));
    assert_eq!(
        wrangler.tracker().status(&first.id),
        Some(SuggestionStatus::Dismissed)
    );

    let again = wrangler.suggestions();
    assert!(again.iter().all(|s| s.id != first.id));
    assert_eq!(again.len(), suggestions.len() - 1);
}

#[test]
fn test_applying_every_suggestion_cleans_duplicates() {
    let mut wrangler = Wrangler::new();
    wrangler
        .import_csv("name,city\nAda, Oslo\nAda, Oslo\nBob,Lima\n")
        .unwrap();

    for suggestion in wrangler.suggestions() {
        wrangler.apply_suggestion(&suggestion).unwrap();
    }

    let issues = wrangler.engine().issues();
    assert_eq!(issues.duplicate_rows, 0);
    let cities: Vec<String> = wrangler
        .data()
        .column_values("city")
        .map(|v| v.to_string())
        .collect();
    assert_eq!(cities, ["Oslo", "Lima"]);
}

// =============================================================================
// Recipes and export
// =============================================================================

#[test]
fn test_recipe_round_trip_to_file() {
    let input = create_test_file(
        "first,last,amount\nada,lovelace,10.456\ngrace,hopper,3.2\n",
        ".csv",
    );
    let recipe = r#"[
        {"name": "standardizeTextCase", "params": {"columns": ["first", "last"], "caseType": "titlecase"}},
        {"name": "mergeColumns", "params": {"columns": ["first", "last"], "newName": "full", "delimiter": " "}},
        {"name": "roundValues", "params": {"configs": [{"column": "amount", "decimals": 1}]}},
        {"name": "createCalculatedColumn", "params": {"newName": "double", "formula": "amount * 2"}},
        {"name": "sortData", "params": {"sortColumns": [{"column": "amount"}]}}
    ]"#;

    let mut wrangler = Wrangler::new();
    wrangler.import_file(input.path()).unwrap();
    assert_eq!(wrangler.apply_recipe(recipe).unwrap(), 5);

    let output = create_test_file("", ".csv");
    wrangler.export_to_path(output.path(), None).unwrap();
    let written = std::fs::read_to_string(output.path()).unwrap();
    assert_eq!(
        written,
        "amount,full,double\n3.2,Grace Hopper,6.4\n10.5,Ada Lovelace,21\n"
    );

    let history = wrangler.engine().operation_history();
    assert_eq!(history.len(), 5);
    assert_eq!(history[4].name, "sortData");
}

#[test]
fn test_json_export_and_reimport() {
    let mut wrangler = Wrangler::new();
    wrangler.import_csv("a,b\n1,x\n2,\n").unwrap();
    let json = wrangler.export(ExportFormat::Json).unwrap();

    let mut other = Wrangler::new();
    other.import_json(&json).unwrap();
    assert_eq!(other.data(), wrangler.data());
}

#[test]
fn test_custom_config() {
    let mut config = WranglerConfig::default();
    config.parser.max_rows = Some(2);
    config.engine.history_limit = 1;

    let mut wrangler = Wrangler::with_config(config).unwrap();
    wrangler.import_csv("a\n3\n1\n2\n").unwrap();
    assert_eq!(wrangler.data().len(), 2);

    wrangler
        .apply_recipe(r#"[{"name": "sortData", "params": {"sortColumns": [{"column": "a"}]}}, {"name": "dropEmptyColumns"}]"#)
        .unwrap();
    assert_eq!(wrangler.engine().history().len(), 1);
    assert!(wrangler.undo().unwrap());
    assert!(!wrangler.undo().unwrap());

    let values: Vec<String> = wrangler.data().column_values("a").map(|v| v.to_string()).collect();
    assert_eq!(values, ["1", "3"]);
}
