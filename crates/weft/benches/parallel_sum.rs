//! Parallel vs serial range sum

use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{criterion_group, criterion_main, Criterion};
use weft::{Arena, Profiling, Runtime, SchedulerConfig};

const SIZE: u32 = 1_000_000;

fn range_sum(c: &mut Criterion) {
    let mut rt = Runtime::new(SchedulerConfig::new(), Profiling::default()).unwrap();
    rt.start(Arena::new(rt.needed_memory())).unwrap();
    let partials: Vec<AtomicU64> = (0..rt.num_threads()).map(|_| AtomicU64::new(0)).collect();

    c.bench_function("sum_1m_parallel", |b| {
        b.iter(|| {
            for p in &partials {
                p.store(0, Ordering::Relaxed);
            }
            rt.run(black_box(SIZE), 4096, |partition, worker_id| {
                let mut sum = 0u64;
                for i in partition.start..partition.end {
                    sum += u64::from(i) + 1;
                }
                partials[worker_id as usize].fetch_add(sum, Ordering::Relaxed);
            });
            partials.iter().map(|p| p.load(Ordering::Relaxed)).sum::<u64>()
        })
    });

    c.bench_function("sum_1m_serial", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..black_box(SIZE) {
                sum += u64::from(i) + 1;
            }
            sum
        })
    });

    rt.stop(true).unwrap();
}

criterion_group!(benches, range_sum);
criterion_main!(benches);
