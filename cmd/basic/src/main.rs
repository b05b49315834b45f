//! Basic weft example
//!
//! Parallel reduction sum: an outer task submits and joins an inner
//! data-parallel sum from inside its own callable (braided parallelism),
//! then the result is checked against the serial computation.

use std::sync::atomic::{AtomicU64, Ordering};

use weft::{Arena, Profiling, Runtime, SchedulerConfig};

const MAX: u32 = 10 * 1024 * 1024;

fn main() {
    println!("=== weft basic example ===\n");

    let mut rt = Runtime::new(SchedulerConfig::from_env(), Profiling::default())
        .expect("invalid scheduler configuration");
    println!(
        "threads: {}, arena: {} KiB",
        rt.num_threads(),
        rt.needed_memory() / 1024
    );

    rt.start(Arena::new(rt.needed_memory())).expect("start failed");

    let partials: Vec<AtomicU64> = (0..rt.num_threads()).map(|_| AtomicU64::new(0)).collect();
    let parallel_sum = AtomicU64::new(0);

    // The outer task runs once; inside it, the inner task set fans the
    // range out across all workers.
    rt.run_with(1, 1, |sched, _partition, _worker_id| {
        sched.run(MAX, 1024, |partition, worker_id| {
            let mut sum = 0u64;
            for i in partition.start..partition.end {
                sum += u64::from(i) + 1;
            }
            partials[worker_id as usize].fetch_add(sum, Ordering::Relaxed);
        });
        let total: u64 = partials.iter().map(|p| p.load(Ordering::Relaxed)).sum();
        parallel_sum.store(total, Ordering::Release);
    });

    let parallel = parallel_sum.load(Ordering::Acquire);
    println!("parallel sum:\t{}", parallel);

    let serial: u64 = (0..MAX).map(|i| u64::from(i) + 1).sum();
    println!("serial sum:\t{}", serial);

    assert_eq!(parallel, serial);
    println!("\n=== complete ===");

    rt.stop(true).expect("stop failed");
}
