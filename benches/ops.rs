//! Micro-operation benchmarks for the concurrent cache.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency (nanoseconds) for get, insert, and mixed
//! workloads, single-threaded and across thread counts.

use std::hint::black_box;
use std::thread;
use std::time::Instant;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use memocache::builder::CacheBuilder;
use memocache::cache::Cache;

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

fn cache() -> Cache<u64, u64> {
    CacheBuilder::new().maximum_capacity(CAPACITY).build()
}

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("single_thread", |b| {
        b.iter_custom(|iters| {
            let cache = cache();
            for i in 0..CAPACITY as u64 {
                cache.put(i, i);
            }
            cache.drain_buffers();
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    let key = i % (CAPACITY as u64);
                    black_box(cache.get(&key));
                }
            }
            start.elapsed()
        })
    });

    for threads in [2u64, 4, 8] {
        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let cache = cache();
                for i in 0..CAPACITY as u64 {
                    cache.put(i, i);
                }
                cache.drain_buffers();
                let start = Instant::now();
                for _ in 0..iters {
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let cache = cache.clone();
                            thread::spawn(move || {
                                for i in 0..OPS / threads {
                                    let key = (t * 131 + i) % (CAPACITY as u64);
                                    black_box(cache.get(&key));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Insert with Eviction (ns/op)
// ============================================================================

fn bench_insert_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_evict_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("single_thread", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let cache = cache();
                for i in 0..CAPACITY as u64 {
                    cache.put(i, i);
                }
                cache.drain_buffers();
                let start = Instant::now();
                for i in 0..OPS {
                    let key = CAPACITY as u64 + i;
                    cache.put(key, key);
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("4_threads", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let cache = cache();
                for i in 0..CAPACITY as u64 {
                    cache.put(i, i);
                }
                cache.drain_buffers();
                let start = Instant::now();
                let handles: Vec<_> = (0..4u64)
                    .map(|t| {
                        let cache = cache.clone();
                        thread::spawn(move || {
                            for i in 0..OPS / 4 {
                                let key = CAPACITY as u64 + t * OPS + i;
                                cache.put(key, key);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

// ============================================================================
// Mixed Workload (get + insert)
// ============================================================================

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_ops_ns");
    group.throughput(Throughput::Elements(OPS));

    // 80% hits, 20% misses causing inserts
    group.bench_function("single_thread", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let cache = cache();
                for i in 0..CAPACITY as u64 {
                    cache.put(i, i);
                }
                cache.drain_buffers();
                let start = Instant::now();
                for i in 0..OPS {
                    let key = if i % 5 == 0 {
                        CAPACITY as u64 + i
                    } else {
                        i % (CAPACITY as u64)
                    };
                    if cache.get(&key).is_none() {
                        cache.put(key, key);
                    }
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("8_threads", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let cache = cache();
                for i in 0..CAPACITY as u64 {
                    cache.put(i, i);
                }
                cache.drain_buffers();
                let start = Instant::now();
                let handles: Vec<_> = (0..8u64)
                    .map(|t| {
                        let cache = cache.clone();
                        thread::spawn(move || {
                            for i in 0..OPS / 8 {
                                let key = if i % 5 == 0 {
                                    CAPACITY as u64 + t * OPS + i
                                } else {
                                    (t * 977 + i) % (CAPACITY as u64)
                                };
                                if cache.get(&key).is_none() {
                                    cache.put(key, key);
                                }
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_insert_evict, bench_mixed);
criterion_main!(benches);
