//! B-tree benchmarks for bough
//!
//! These benchmarks measure the operations that dominate real workloads:
//! inserts in order and out of order, point reads with and without path
//! hints, bulk loading against plain insertion, full scans, draining,
//! and the copy-on-write cost of writing after a snapshot.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box as hint_black_box;

use bough::{BTree, PathHint};

fn shuffled(count: usize) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..count as u64).collect();
    let mut state = 0x9e3779b97f4a7c15u64;
    for i in (1..keys.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        keys.swap(i, (state % (i as u64 + 1)) as usize);
    }
    keys
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_set");

    for count in [1_000usize, 100_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("sequential", count), count, |b, &count| {
            b.iter(|| {
                let mut tree = BTree::new();
                for i in 0..count as u64 {
                    tree.set(i);
                }
                tree.count()
            });
        });

        group.bench_with_input(BenchmarkId::new("random", count), count, |b, &count| {
            let keys = shuffled(count);
            b.iter(|| {
                let mut tree = BTree::new();
                for &key in &keys {
                    tree.set(key);
                }
                tree.count()
            });
        });

        group.bench_with_input(
            BenchmarkId::new("sequential_hint", count),
            count,
            |b, &count| {
                b.iter(|| {
                    let mut tree = BTree::new();
                    let mut hint = PathHint::new();
                    for i in 0..count as u64 {
                        tree.set_hint(i, &mut hint);
                    }
                    tree.count()
                });
            },
        );
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_get");

    for count in [1_000usize, 100_000].iter() {
        let mut tree = BTree::new();
        for i in 0..*count as u64 {
            tree.set(i);
        }

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("plain", count), count, |b, &count| {
            b.iter(|| {
                let mut hits = 0;
                for i in 0..count as u64 {
                    if tree.get(black_box(&i)).is_some() {
                        hits += 1;
                    }
                }
                hits
            });
        });

        group.bench_with_input(BenchmarkId::new("hinted", count), count, |b, &count| {
            b.iter(|| {
                let mut hint = PathHint::new();
                let mut hits = 0;
                for i in 0..count as u64 {
                    if tree.get_hint(black_box(&i), &mut hint).is_some() {
                        hits += 1;
                    }
                }
                hits
            });
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_load");

    for count in [10_000usize, 100_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("load_sorted", count), count, |b, &count| {
            b.iter(|| {
                let mut tree = BTree::new();
                for i in 0..count as u64 {
                    tree.load(i);
                }
                tree.count()
            });
        });

        group.bench_with_input(BenchmarkId::new("set_sorted", count), count, |b, &count| {
            b.iter(|| {
                let mut tree = BTree::new();
                for i in 0..count as u64 {
                    tree.set(i);
                }
                tree.count()
            });
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_scan");

    for count in [100_000usize].iter() {
        let mut tree = BTree::new();
        for i in 0..*count as u64 {
            tree.load(i);
        }

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("ascend", count), count, |b, _| {
            b.iter(|| {
                let mut sum = 0u64;
                tree.ascend(None, |&item| {
                    sum = sum.wrapping_add(item);
                    true
                });
                hint_black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("cursor", count), count, |b, _| {
            b.iter(|| {
                let mut sum = 0u64;
                let mut it = tree.iter();
                let mut more = it.first();
                while more {
                    sum = sum.wrapping_add(*it.item().unwrap());
                    more = it.next();
                }
                hint_black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_drain");

    for count in [10_000usize].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("pop_min", count), count, |b, &count| {
            b.iter_with_setup(
                || {
                    let mut tree = BTree::new();
                    for i in 0..count as u64 {
                        tree.load(i);
                    }
                    tree
                },
                |mut tree| {
                    while tree.pop_min().is_some() {}
                    tree
                },
            );
        });

        group.bench_with_input(BenchmarkId::new("delete_keys", count), count, |b, &count| {
            b.iter_with_setup(
                || {
                    let mut tree = BTree::new();
                    for i in 0..count as u64 {
                        tree.load(i);
                    }
                    tree
                },
                |mut tree| {
                    for i in 0..count as u64 {
                        tree.delete(&i);
                    }
                    tree
                },
            );
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_snapshot");

    let mut tree = BTree::new();
    for i in 0..100_000u64 {
        tree.load(i);
    }

    group.bench_function("clone", |b| {
        b.iter(|| hint_black_box(tree.clone().count()));
    });

    group.bench_function("write_after_clone", |b| {
        b.iter_with_setup(
            || tree.clone(),
            |mut snapshot| {
                snapshot.set(black_box(50_000));
                snapshot
            },
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_load,
    bench_scan,
    bench_drain,
    bench_snapshot,
);
criterion_main!(benches);
