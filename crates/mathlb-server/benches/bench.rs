use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use mathlb_server::server::pool::manager::{Worker, WorkerPool};
use std::thread::scope;

const SELECTIONS_PER_THREAD: u64 = 10_000;

fn pool(size: usize) -> WorkerPool<usize> {
    WorkerPool::new(
        (0..size)
            .map(|i| Worker::new(format!("10.0.0.{i}:50051"), i))
            .collect(),
    )
}

fn bench_next_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("next/single_thread");
    group.throughput(Throughput::Elements(1));

    for size in [1, 4, 64] {
        let pool = pool(size);
        group.bench_function(format!("workers={size}"), |b| {
            b.iter(|| black_box(*pool.next().unwrap().connection()));
        });
    }

    group.finish();
}

fn bench_next_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("next/contended");

    for threads in [2, 4, 8] {
        let pool = &pool(16);
        group.throughput(Throughput::Elements(threads * SELECTIONS_PER_THREAD));
        group.bench_function(format!("threads={threads}"), |b| {
            b.iter(|| {
                scope(|s| {
                    for _ in 0..threads {
                        s.spawn(move || {
                            for _ in 0..SELECTIONS_PER_THREAD {
                                black_box(*pool.next().unwrap().connection());
                            }
                        });
                    }
                });
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_next_single_thread, bench_next_contended);
criterion_main!(benches);
