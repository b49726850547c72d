use core::hint::black_box;
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

use chrono::NaiveDate;
use criterion::async_executor::SmolExecutor;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::future::try_join_all;
use locseq::{
    Identifier, MemoryStore, PartitionKey, Registrar, SequenceAllocator, SmolSleep, TokioSleep,
    format, parse, resolve,
};
use tokio::runtime::Builder;

// Sequence numbers allocated per benchmark iteration. Stays well below
// `Sequence::MAX` so a fresh partition never runs out.
const TOTAL_IDS: usize = 4096;

fn key() -> PartitionKey {
    resolve("Chennai", &NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let identifier: Identifier = "CHN-2025-04242".parse().unwrap();
    let (k, sequence) = identifier.into_parts();

    group.throughput(Throughput::Elements(1));
    group.bench_function("format", |b| {
        b.iter(|| black_box(format(black_box(&k), black_box(sequence))));
    });
    group.bench_function("parse", |b| {
        b.iter(|| black_box(parse(black_box("CHN-2025-04242"))));
    });
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let now = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    for (name, raw) in [
        ("known", "Chennai"),
        ("alias", "  new   DELHI "),
        ("segment", "Anna Nagar, Chennai, Tamil Nadu"),
        ("derived", "Springfield"),
        ("hashed", "東京"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(resolve(black_box(raw), &now)));
        });
    }
    group.finish();
}

/// Single-threaded increments straight on the store, without the async
/// allocator around them.
fn bench_memory_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_store");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    let k = key();

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let store = MemoryStore::new();
                for _ in 0..TOTAL_IDS {
                    black_box(store.increment(&k));
                }
            }
            start.elapsed()
        });
    });
    group.finish();
}

/// Threads racing on one counter row.
fn bench_memory_store_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_store/contended");
    let k = key();

    for num_threads in [1, 2, 4, 8] {
        let per_thread = TOTAL_IDS / num_threads;
        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{}/threads/{}", TOTAL_IDS, num_threads), |b| {
            b.iter_custom(|iters| {
                let mut total = core::time::Duration::ZERO;
                for _ in 0..iters {
                    let store = MemoryStore::new();
                    let barrier = Barrier::new(num_threads + 1);
                    let elapsed = scope(|s| {
                        for _ in 0..num_threads {
                            s.spawn(|| {
                                barrier.wait();
                                for _ in 0..per_thread {
                                    black_box(store.increment(&k));
                                }
                            });
                        }
                        barrier.wait();
                        Instant::now()
                    });
                    total += elapsed.elapsed();
                }
                total
            });
        });
    }
    group.finish();
}

fn bench_allocator_async_tokio(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/tokio");
    group.sample_size(10);
    group.sampling_mode(criterion::SamplingMode::Flat);
    let k = key();

    for num_tasks in [1, 8, 64, 256] {
        let per_task = TOTAL_IDS / num_tasks;
        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{}/tasks/{}", TOTAL_IDS, num_tasks), |b| {
            let rt = Builder::new_multi_thread().enable_all().build().unwrap();

            b.to_async(&rt).iter_custom(move |iters| async move {
                let start = Instant::now();
                for _ in 0..iters {
                    let allocator = Arc::new(SequenceAllocator::new(MemoryStore::new()));
                    let tasks: Vec<_> = (0..num_tasks)
                        .map(|_| {
                            let allocator = Arc::clone(&allocator);
                            tokio::spawn(async move {
                                for _ in 0..per_task {
                                    let sequence =
                                        allocator.allocate_with::<TokioSleep>(&k).await?;
                                    black_box(sequence);
                                }
                                Ok::<_, locseq::Error>(())
                            })
                        })
                        .collect();

                    for result in try_join_all(tasks).await.unwrap() {
                        result.unwrap();
                    }
                }
                start.elapsed()
            });
        });
    }
    group.finish();
}

fn bench_registrar_async_smol(c: &mut Criterion) {
    let mut group = c.benchmark_group("registrar/smol");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    let now = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.to_async(SmolExecutor).iter_custom(|iters| async move {
            let start = Instant::now();
            for _ in 0..iters {
                let registrar = Registrar::new(MemoryStore::new());
                for _ in 0..TOTAL_IDS {
                    let id = registrar
                        .register_with::<SmolSleep, _>("Chennai", &now)
                        .await
                        .unwrap();
                    black_box(id);
                }
            }
            start.elapsed()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_codec,
    bench_resolve,
    bench_memory_store,
    bench_memory_store_contended,
    bench_allocator_async_tokio,
    bench_registrar_async_smol,
);
criterion_main!(benches);
