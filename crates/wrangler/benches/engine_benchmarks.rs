//! Engine performance benchmarks.
//!
//! Measures apply cost and undo/redo replay cost against dataset size and
//! history length, plus parsing and suggestion generation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wrangler::input::parse_csv;
use wrangler::operations::{FillMethod, SortKey};
use wrangler::{generate_suggestions, DataEngine, Dataset, Operation};

/// Generate messy customer-like CSV with duplicates, gaps and padding.
fn generate_csv(rows: usize) -> String {
    let mut data = String::from("id,first_name,last_name,city,amount,signup\n");
    let cities = ["Oslo", " oslo", "Lima", "LIMA ", "Perth"];
    let firsts = ["Ada", "Grace", "Alan", "Edsger"];
    let lasts = ["Lovelace", "Hopper", "Turing", "Dijkstra"];

    for row in 0..rows {
        // Every 20th row repeats the previous id
        let id = if row % 20 == 0 && row > 0 { row } else { row + 1 };
        let amount = if row % 97 == 0 {
            String::from("99999")
        } else if row % 13 == 0 {
            String::new()
        } else {
            format!("{:.2}", 10.0 + (row % 50) as f64 * 1.25)
        };
        data.push_str(&format!(
            "{},{},{},{},{},{:02}/{:02}/2023\n",
            id,
            firsts[row % firsts.len()],
            lasts[row % lasts.len()],
            cities[row % cities.len()],
            amount,
            (row % 12) + 1,
            (row % 28) + 1
        ));
    }
    data
}

fn dataset(rows: usize) -> Dataset {
    parse_csv(&generate_csv(rows)).expect("benchmark data parses")
}

fn cleanup_ops() -> Vec<Operation> {
    vec![
        Operation::TrimWhitespace { columns: None },
        Operation::FillMissingValues {
            columns: vec!["amount".to_string()],
            method: FillMethod::Median,
            value: None,
        },
        Operation::RemoveDuplicates { keys: None },
        Operation::SortData {
            sort_columns: vec![SortKey::asc("city"), SortKey::desc("amount")],
        },
    ]
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");
    for rows in [100, 1_000, 10_000] {
        let text = generate_csv(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| parse_csv(black_box(text)).expect("parse"))
        });
    }
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_apply");
    for rows in [100, 1_000, 10_000] {
        let data = dataset(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| {
                let mut engine = DataEngine::from_dataset(data.clone());
                engine.apply_all(cleanup_ops()).expect("apply");
                black_box(engine.data().len())
            })
        });
    }
    group.finish();
}

/// Undo replays every retained operation from the start, so its cost grows
/// with history length.
fn bench_undo_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_undo_replay");
    let data = dataset(1_000);
    for history in [1, 10, 50] {
        let mut engine = DataEngine::from_dataset(data.clone());
        for op in cleanup_ops().into_iter().cycle().take(history) {
            engine.apply(op).expect("apply");
        }
        group.bench_with_input(BenchmarkId::from_parameter(history), &engine, |b, engine| {
            b.iter(|| {
                let mut engine = engine.clone();
                engine.undo().expect("undo");
                engine.redo().expect("redo");
                black_box(engine.current_operation_index())
            })
        });
    }
    group.finish();
}

fn bench_suggestions(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_suggestions");
    for rows in [100, 1_000] {
        let data = dataset(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| generate_suggestions(black_box(data)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_apply, bench_suggestions);

// Replay benchmarks run separately due to longer execution time
criterion_group!(
    name = replay_benches;
    config = Criterion::default().sample_size(20);
    targets = bench_undo_replay
);

criterion_main!(benches, replay_benches);
