//! weft benchmark
//!
//! Times a data-parallel range sum against the serial loop across a sweep
//! of grain sizes. Run with --release; WEFT_THREADS overrides the pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use weft::{env_get, Arena, Profiling, Runtime, SchedulerConfig};

fn main() {
    let size: u32 = env_get("BENCH_SIZE", 50_000_000);
    let repeats: u32 = env_get("BENCH_REPEATS", 5);

    let mut rt = Runtime::new(SchedulerConfig::from_env(), Profiling::default())
        .expect("invalid configuration");
    rt.start(Arena::new(rt.needed_memory())).expect("start failed");

    println!(
        "=== weft benchmark: sum of 1..={} on {} threads ===\n",
        size,
        rt.num_threads()
    );

    // Serial baseline
    let mut serial_sum = 0u64;
    let serial_start = Instant::now();
    for _ in 0..repeats {
        serial_sum = 0;
        for i in 0..size {
            serial_sum += u64::from(i) + 1;
        }
    }
    let serial = serial_start.elapsed() / repeats;
    println!("serial:              {:>10.2?}  (sum {})", serial, serial_sum);

    let partials: Vec<AtomicU64> = (0..rt.num_threads()).map(|_| AtomicU64::new(0)).collect();
    for grain in [1024u32, 16 * 1024, 256 * 1024] {
        let start = Instant::now();
        let mut total = 0u64;
        for _ in 0..repeats {
            for p in &partials {
                p.store(0, Ordering::Relaxed);
            }
            rt.run(size, grain, |partition, worker_id| {
                let mut sum = 0u64;
                for i in partition.start..partition.end {
                    sum += u64::from(i) + 1;
                }
                partials[worker_id as usize].fetch_add(sum, Ordering::Relaxed);
            });
            total = partials.iter().map(|p| p.load(Ordering::Relaxed)).sum();
        }
        let elapsed = start.elapsed() / repeats;
        assert_eq!(total, serial_sum);
        let speedup = serial.as_secs_f64() / elapsed.as_secs_f64();
        println!(
            "parallel grain {:>6}: {:>10.2?}  ({:.2}x)",
            grain, elapsed, speedup
        );
    }

    rt.stop(true).expect("stop failed");
    println!("\n=== benchmark complete ===");
}
