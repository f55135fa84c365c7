//! Basic benchmarks for `PoolManager`.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use object_pool::PoolManager;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const ITEM_CAPACITY: usize = 4096;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("manager_basic");

    group.bench_function("register", |b| {
        b.iter(|| {
            let pools = PoolManager::new();
            black_box(pools.register::<String>())
        });
    });

    let pools = PoolManager::new();
    pools
        .register_with_factory(|| Vec::<u8>::with_capacity(ITEM_CAPACITY))
        .expect("Vec<u8> is reference-like");
    pools.add(Vec::<u8>::with_capacity(ITEM_CAPACITY));

    group.bench_function("get_add_hit", |b| {
        b.iter(|| {
            let item = black_box(pools.get::<Vec<u8>>());
            pools.add(item.expect("type is registered"));
        });
    });

    group.bench_function("get_unregistered", |b| {
        b.iter(|| black_box(pools.get::<String>()));
    });

    group.finish();
}
