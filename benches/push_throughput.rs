//! Benchmarks for submission and drain throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use priority_tasks::prelude::*;

fn bench_push_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_drain");

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| {
                let manager = TaskManager::new(workers, 4, 256, Some(handler(|n: u64| {
                    black_box(n * n);
                })));
                for n in 0..10_000u64 {
                    manager.push_task((n % 5) as isize, n);
                }
                manager.shutdown().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_priority_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_levels");

    // scan cost grows with the level count when urgent levels are empty
    for max_priority in [1isize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_priority),
            &max_priority,
            |b, &max_priority| {
                b.iter(|| {
                    let manager = TaskManager::new(2, max_priority, 256, Some(handler(|n: u64| {
                        black_box(n);
                    })));
                    for n in 0..10_000u64 {
                        manager.push_task(max_priority, n);
                    }
                    manager.shutdown().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_push_drain, bench_priority_levels);
criterion_main!(benches);
