//! Criterion benchmarks for whatif_core
//!
//! Run with: cargo bench -p whatif_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use whatif_core::{ParameterSpec, RiskThresholds, ScenarioStore, Schema, StoreOptions, StressConfig};

fn create_schema(line_items: usize) -> Schema {
    let mut builder = Schema::builder();
    for i in 0..line_items {
        let spec = if i % 2 == 0 {
            ParameterSpec::income(format!("income_{i}"))
        } else {
            ParameterSpec::expense(format!("expense_{i}"))
        };
        builder = builder.parameter(spec.range(0.0, 100_000.0).default_value(50_000.0));
    }
    builder.build().unwrap()
}

fn create_store(line_items: usize) -> ScenarioStore {
    let mut store = ScenarioStore::new();
    store
        .initialize(create_schema(line_items), RiskThresholds::new(-5_000.0))
        .unwrap();
    store
}

/// Simulates a slider drag: many edits to one key, metrics read after each
fn bench_slider_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("slider_drag");

    for line_items in [4, 32, 256].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(line_items),
            line_items,
            |b, &line_items| {
                let mut store = create_store(line_items);
                let mut value = 0.0;
                b.iter(|| {
                    value = (value + 1.0) % 100_000.0;
                    store.set_parameter("income_0", black_box(value)).unwrap();
                    black_box(store.derived_metrics().unwrap().balance)
                })
            },
        );
    }

    group.finish();
}

fn bench_history_at_capacity(c: &mut Criterion) {
    c.bench_function("history_at_capacity", |b| {
        let mut store = ScenarioStore::with_options(StoreOptions {
            history_capacity: 50,
        });
        store
            .initialize(create_schema(16), RiskThresholds::new(0.0))
            .unwrap();
        for i in 0..100 {
            store.set_parameter("income_0", i as f64).unwrap();
        }
        b.iter(|| {
            store.set_parameter("income_0", black_box(1.0)).unwrap();
            store.undo().unwrap();
            store.redo().unwrap()
        })
    });
}

fn bench_memoized_metrics(c: &mut Criterion) {
    let mut store = create_store(256);
    c.bench_function("memoized_metrics", |b| {
        b.iter(|| black_box(store.derived_metrics().unwrap().balance))
    });
}

fn bench_stress(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress_test");
    let store = create_store(32);

    for iterations in [100, 1_000, 10_000].iter() {
        let config = StressConfig {
            iterations: *iterations,
            relative_std_dev: 0.1,
            seed: 42,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &config,
            |b, config| b.iter(|| store.stress_test(black_box(config)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_slider_drag,
    bench_history_at_capacity,
    bench_memoized_metrics,
    bench_stress
);
criterion_main!(benches);
