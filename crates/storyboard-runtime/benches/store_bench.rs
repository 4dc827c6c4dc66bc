//! Benchmarks for document store commit, undo and typing throughput.
//!
//! Run with: cargo bench -p storyboard-runtime --bench store_bench
//!
//! Snapshots share structure through `im::Vector`, so commit cost should
//! stay flat as the document grows.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use storyboard_core::id::IdGenerator;
use storyboard_runtime::{DocumentStore, StoreConfig};
use web_time::Instant;

// ============================================================================
// Setup helpers
// ============================================================================

/// A store with `groups` groups of `items` items each and empty history.
fn setup_store(groups: usize, items: usize) -> DocumentStore {
    let mut store = DocumentStore::with_ids(StoreConfig::default(), IdGenerator::seeded(42));
    for _ in 1..groups {
        store.add_group();
    }
    let ids: Vec<_> = store
        .current()
        .groups()
        .iter()
        .map(|g| g.id().clone())
        .collect();
    for id in &ids {
        for _ in 1..items {
            store.add_item(id);
        }
    }
    let document = store.current().clone();
    store.restore(document);
    store
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/commit");
    for &(groups, items) in &[(1usize, 10usize), (10, 50), (50, 100)] {
        group.bench_with_input(
            BenchmarkId::new("add_item", groups * items),
            &(groups, items),
            |b, &(groups, items)| {
                let mut store = setup_store(groups, items);
                let target = store.current().groups()[0].id().clone();
                b.iter(|| black_box(store.add_item(&target)));
            },
        );
    }
    group.finish();
}

fn bench_undo_redo(c: &mut Criterion) {
    c.bench_function("store/undo_redo_cycle", |b| {
        let mut store = setup_store(10, 50);
        let target = store.current().groups()[0].id().clone();
        for _ in 0..50 {
            store.add_item(&target);
        }
        b.iter(|| {
            while store.undo() {}
            while store.redo() {}
            black_box(store.revision())
        });
    });
}

fn bench_typing(c: &mut Criterion) {
    c.bench_function("store/typing_burst_20", |b| {
        let mut store = setup_store(10, 50);
        let group = store.current().groups()[0].id().clone();
        let item = store.current().groups()[0].items()[0].id.clone();
        b.iter(|| {
            let t0 = Instant::now();
            let mut text = String::new();
            for n in 0..20u64 {
                text.push('x');
                store.update_text_at(&group, &item, text.clone(), t0 + Duration::from_millis(n * 30));
            }
            black_box(store.flush())
        });
    });
}

criterion_group!(benches, bench_commit, bench_undo_redo, bench_typing);
criterion_main!(benches);
