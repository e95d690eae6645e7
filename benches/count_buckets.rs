//! Micro-operation benchmarks for `CountBuckets`.
//!
//! Run with: `cargo bench --bench count_buckets`

use std::hint::black_box;

use countkit::ds::CountBuckets;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};

const KEYS: u64 = 4096;

/// Key `k` ends up at count `k % spread + 1`.
fn populated(spread: u64) -> CountBuckets<u64> {
    let mut store = CountBuckets::with_capacity(KEYS as usize);
    for key in 0..KEYS {
        for _ in 0..=(key % spread) {
            store.increment(key);
        }
    }
    store
}

fn bench_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_buckets_increment");
    group.throughput(Throughput::Elements(KEYS));

    group.bench_function("new_keys", |b| {
        b.iter_batched(
            || CountBuckets::<u64>::with_capacity(KEYS as usize),
            |mut store| {
                for key in 0..KEYS {
                    store.increment(black_box(key));
                }
                store
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("existing_keys", |b| {
        b.iter_batched(
            || populated(64),
            |mut store| {
                for key in 0..KEYS {
                    store.increment(black_box(key));
                }
                store
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("single_hot_key", |b| {
        b.iter_batched(
            || populated(1),
            |mut store| {
                for _ in 0..KEYS {
                    store.increment(black_box(0));
                }
                store
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_decrement(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_buckets_decrement");
    group.throughput(Throughput::Elements(KEYS));

    group.bench_function("drain_to_empty", |b| {
        b.iter_batched(
            || populated(1),
            |mut store| {
                for key in 0..KEYS {
                    black_box(store.decrement(&key));
                }
                store
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("missing_keys", |b| {
        b.iter_batched(
            || populated(8),
            |mut store| {
                for key in KEYS..KEYS * 2 {
                    black_box(store.decrement(&key));
                }
                store
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_extremes(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_buckets_extremes");
    group.throughput(Throughput::Elements(1));
    let store = populated(512);

    group.bench_function("max_key", |b| b.iter(|| black_box(store.max_key())));
    group.bench_function("min_key", |b| b.iter(|| black_box(store.min_key())));
    group.finish();
}

criterion_group!(benches, bench_increment, bench_decrement, bench_extremes);
criterion_main!(benches);
