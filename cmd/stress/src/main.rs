//! weft stress test
//!
//! Hammers the scheduler with rounds of braided submissions: every
//! top-level partition submits nested task sets from inside its callable,
//! tiny pipes force the inline-overflow path, and total coverage is
//! verified after every round.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use weft::{env_get, Arena, Profiling, Runtime, SchedulerConfig};

fn main() {
    let rounds: u32 = env_get("STRESS_ROUNDS", 50);
    let outer: u32 = env_get("STRESS_OUTER", 64);
    let inner: u32 = env_get("STRESS_INNER", 10_000);

    println!("=== weft stress: {} rounds ===\n", rounds);

    // Deliberately small pipes so the overflow path gets constant exercise
    let config = SchedulerConfig::from_env().pipe_size_log2(3);
    let mut rt = Runtime::new(config, Profiling::default()).expect("invalid configuration");
    println!(
        "threads: {}, pipe capacity: {}, arena: {} KiB",
        rt.num_threads(),
        2usize << 3,
        rt.needed_memory() / 1024
    );
    rt.start(Arena::new(rt.needed_memory())).expect("start failed");

    let expected = u64::from(outer) * u64::from(inner);
    let started = Instant::now();

    for round in 0..rounds {
        let covered = AtomicU64::new(0);

        // Each outer index fans out a nested task set and joins it before
        // returning; joins help, so workers stay busy instead of blocking.
        rt.run_with(outer, 1, |sched, outer_part, _worker_id| {
            for _ in outer_part.start..outer_part.end {
                sched.run(inner, 64, |inner_part, _| {
                    covered.fetch_add(u64::from(inner_part.len()), Ordering::Relaxed);
                });
            }
        });

        let covered = covered.load(Ordering::Relaxed);
        assert_eq!(covered, expected, "round {} lost coverage", round);
        if round % 10 == 0 {
            println!("round {:3}: covered {} indices", round, covered);
        }
    }

    println!(
        "\n{} rounds x {} indices in {:?}",
        rounds,
        expected,
        started.elapsed()
    );

    rt.stop(true).expect("stop failed");
    println!("=== stress complete ===");
}
