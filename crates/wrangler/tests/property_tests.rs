//! Property-based tests for operations and the engine.
//!
//! These tests use proptest to generate random datasets and operation
//! sequences and verify that core invariants hold for all of them.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p wrangler --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p wrangler --test property_tests
//! ```

use proptest::prelude::*;

use wrangler::input::{parse_csv, to_csv};
use wrangler::operations::cleaning::{fill_missing_values, remove_duplicates};
use wrangler::operations::transform::sort_data;
use wrangler::operations::{FillMethod, SortKey, TextCase};
use wrangler::{CellValue, DataEngine, Dataset, Operation, Row};

// =============================================================================
// Test Strategies
// =============================================================================

/// Plain cell text: no delimiters, quotes, newlines or padding.
fn plain_text() -> impl Strategy<Value = String> + Clone {
    "[a-z][a-z0-9]{0,7}"
}

/// A cell that survives CSV coercion unchanged.
fn csv_safe_cell() -> impl Strategy<Value = CellValue> + Clone {
    prop_oneof![
        Just(CellValue::Null),
        any::<bool>().prop_map(CellValue::Bool),
        (-10_000i64..10_000).prop_map(|n| CellValue::Number(n as f64)),
        plain_text()
            .prop_filter("not a null or boolean token", |s| {
                !matches!(s.as_str(), "null" | "na" | "true" | "false")
            })
            .prop_map(CellValue::String),
    ]
}

/// A small-domain cell so duplicates are common.
fn small_cell() -> impl Strategy<Value = CellValue> + Clone {
    prop_oneof![
        Just(CellValue::Null),
        (0i64..4).prop_map(|n| CellValue::Number(n as f64)),
        prop_oneof![Just("x"), Just("y"), Just(" y ")].prop_map(CellValue::from),
    ]
}

fn dataset_of<S>(cell: S, max_rows: usize) -> impl Strategy<Value = Dataset>
where
    S: Strategy<Value = CellValue> + Clone,
{
    prop::collection::vec(prop::collection::vec(cell, 3), 1..max_rows).prop_map(|rows| {
        rows.into_iter()
            .map(|cells| {
                ["a", "b", "c"]
                    .iter()
                    .map(|c| c.to_string())
                    .zip(cells)
                    .collect::<Row>()
            })
            .collect()
    })
}

fn columns() -> Vec<String> {
    vec!["a".to_string(), "b".to_string(), "c".to_string()]
}

/// A random operation drawn from the total (never failing) ones.
fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::RemoveDuplicates { keys: None }),
        Just(Operation::TrimWhitespace { columns: None }),
        Just(Operation::RemoveNullRows {
            columns: Some(vec!["a".to_string()])
        }),
        Just(Operation::DropEmptyColumns {}),
        Just(Operation::FillMissingValues {
            columns: vec!["b".to_string()],
            method: FillMethod::Value,
            value: Some(CellValue::from("filled")),
        }),
        Just(Operation::StandardizeTextCase {
            columns: vec!["c".to_string()],
            case_type: TextCase::Uppercase,
        }),
        Just(Operation::SortData {
            sort_columns: vec![SortKey::desc("a")]
        }),
    ]
}

// =============================================================================
// Cleaning laws
// =============================================================================

proptest! {
    /// removeDuplicates is idempotent.
    #[test]
    fn prop_remove_duplicates_idempotent(data in dataset_of(small_cell(), 30)) {
        let once = remove_duplicates(&data, None);
        let twice = remove_duplicates(&once, None);
        prop_assert_eq!(once, twice);
    }

    /// Filling with a literal leaves no empty cell in the target columns.
    #[test]
    fn prop_fill_value_is_complete(data in dataset_of(small_cell(), 30)) {
        let fill = CellValue::from("z");
        let filled = fill_missing_values(&data, &columns(), FillMethod::Value, Some(&fill));
        for row in &filled {
            for column in columns() {
                prop_assert!(!row.get(&column).map(CellValue::is_empty).unwrap_or(true));
            }
        }
        prop_assert_eq!(filled.len(), data.len());
    }
}

// =============================================================================
// Sort laws
// =============================================================================

proptest! {
    /// Descending order is the reverse of ascending for distinct keys.
    #[test]
    fn prop_sort_desc_reverses_asc(
        keys in prop::collection::hash_set(-1_000i64..1_000, 1..40)
    ) {
        let data: Dataset = keys
            .iter()
            .map(|k| {
                let mut row = Row::new();
                row.insert("k".to_string(), CellValue::Number(*k as f64));
                row
            })
            .collect();

        let asc = sort_data(&data, &[SortKey::asc("k")]);
        let desc = sort_data(&data, &[SortKey::desc("k")]);
        let mut reversed = desc.into_rows();
        reversed.reverse();
        prop_assert_eq!(asc.into_rows(), reversed);
    }

    /// Sorting an already sorted dataset by the same key changes nothing.
    #[test]
    fn prop_sort_is_idempotent(data in dataset_of(small_cell(), 30)) {
        let keys = [SortKey::asc("a"), SortKey::desc("b")];
        let once = sort_data(&data, &keys);
        let twice = sort_data(&once, &keys);
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// Engine laws
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// n applies, k undos, k redos equals the state after n applies; the
    /// state after k undos equals the state after n - k applies.
    #[test]
    fn prop_replay_determinism(
        data in dataset_of(small_cell(), 20),
        ops in prop::collection::vec(operation(), 1..12),
        k_seed in any::<usize>(),
    ) {
        let n = ops.len();
        let k = k_seed % (n + 1);

        let mut engine = DataEngine::from_dataset(data);
        let mut states = vec![engine.data().clone()];
        for op in ops {
            engine.apply(op).unwrap();
            states.push(engine.data().clone());
        }

        for _ in 0..k {
            prop_assert!(engine.undo().unwrap());
        }
        prop_assert_eq!(engine.data(), &states[n - k]);

        for _ in 0..k {
            prop_assert!(engine.redo().unwrap());
        }
        prop_assert_eq!(engine.data(), &states[n]);
        prop_assert!(!engine.can_redo());
    }

    /// The history never exceeds its limit and keeps the newest records.
    #[test]
    fn prop_history_is_capped(count in 1usize..80) {
        let mut engine = DataEngine::from_dataset(Dataset::empty());
        let mut ids = Vec::new();
        for _ in 0..count {
            let id = engine
                .apply(Operation::DropEmptyColumns {})
                .unwrap()
                .id
                .clone();
            ids.push(id);
        }

        let history = engine.operation_history();
        prop_assert_eq!(history.len(), count.min(50));
        let kept: Vec<String> = history.into_iter().map(|r| r.id).collect();
        prop_assert_eq!(&kept[..], &ids[ids.len() - kept.len()..]);
    }
}

// =============================================================================
// CSV round-trip
// =============================================================================

proptest! {
    /// Export then import reproduces datasets without special characters.
    #[test]
    fn prop_csv_round_trip(data in dataset_of(csv_safe_cell(), 20)) {
        let csv = to_csv(&data).unwrap();
        let back = parse_csv(&csv).unwrap();
        prop_assert_eq!(back, data);
    }
}
