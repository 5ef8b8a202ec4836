//! Criterion benchmarks for closure-tree core operations.
//!
//! Run with:
//! ```bash
//! cargo bench -p closure-tree
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use closure_tree::{Attributes, CategoryId, TreeStore, ROOT_ID};

// ── helpers ─────────────────────────────────────────────────────────────────

fn open_store() -> TreeStore {
    let store = TreeStore::open_memory().unwrap();
    store.create_tables().unwrap();
    store
}

/// A straight chain `1 -> 2 -> ... -> n` below the root. Returns the ids top-down.
fn populate_chain(store: &TreeStore, n: usize) -> Vec<CategoryId> {
    let mut parent = ROOT_ID;
    (0..n)
        .map(|i| {
            parent = store
                .insert(&Attributes::new(format!("chain_{}", i)), parent)
                .unwrap();
            parent
        })
        .collect()
}

/// A tree where each category has `fanout` children, `depth` levels deep.
fn populate_wide(store: &TreeStore, fanout: usize, depth: usize) -> Vec<CategoryId> {
    let mut layer = vec![ROOT_ID];
    let mut all = Vec::new();
    for _ in 0..depth {
        let mut next = Vec::with_capacity(layer.len() * fanout);
        for &parent in &layer {
            for i in 0..fanout {
                let id = store
                    .insert(&Attributes::new(format!("wide_{}", i)), parent)
                    .unwrap();
                next.push(id);
            }
        }
        all.extend_from_slice(&next);
        layer = next;
    }
    all
}

// ── insert ───────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/insert");

    for &depth in &[1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::new("at_depth", depth), &depth, |b, &depth| {
            let store = open_store();
            let ids = populate_chain(&store, depth);
            let parent = *ids.last().unwrap();
            b.iter(|| store.insert(&Attributes::new("leaf"), parent).unwrap());
        });
    }

    group.finish();
}

// ── reads ────────────────────────────────────────────────────────────────────

fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/read");

    let store = open_store();
    let ids = populate_chain(&store, 100);
    let deep = ids[99];

    group.bench_function("level", |b| b.iter(|| store.level(deep).unwrap()));
    group.bench_function("path", |b| b.iter(|| store.path(deep).unwrap()));
    group.bench_function("ancestor_50", |b| b.iter(|| store.ancestor(deep, 50).unwrap()));
    group.bench_function("subtree_top", |b| b.iter(|| store.subtree(ids[0]).unwrap()));

    group.finish();
}

// ── moves ────────────────────────────────────────────────────────────────────

fn bench_move_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/move_tree");

    for &(fanout, depth) in &[(3usize, 3usize), (4, 4)] {
        let label = format!("{}x{}", fanout, depth);
        group.bench_function(BenchmarkId::new("subtree", label), |b| {
            b.iter_batched(
                || {
                    let store = open_store();
                    let ids = populate_wide(&store, fanout, depth);
                    (store, ids[0], ids[1])
                },
                |(store, first, second)| store.move_tree(first, second).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ── deletes ──────────────────────────────────────────────────────────────────

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/delete");

    group.bench_function("lift_children", |b| {
        b.iter_batched(
            || {
                let store = open_store();
                let ids = populate_wide(&store, 4, 3);
                (store, ids[0])
            },
            |(store, id)| store.delete(id).unwrap(),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("whole_subtree", |b| {
        b.iter_batched(
            || {
                let store = open_store();
                let ids = populate_wide(&store, 4, 3);
                (store, ids[0])
            },
            |(store, id)| store.delete_tree(id).unwrap(),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ── criterion wiring ─────────────────────────────────────────────────────────

criterion_group!(benches, bench_insert, bench_reads, bench_move_tree, bench_delete);
criterion_main!(benches);
