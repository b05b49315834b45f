//! # weft - data-parallel task scheduler
//!
//! Embeddable, allocation-free, multi-threaded task scheduler: submit a
//! callable plus an index range `[0, size)`, the range is partitioned across
//! a fixed pool of worker threads, and any thread — including a worker inside
//! a running task — can wait for completion or submit further work (braided
//! parallelism).
//!
//! ## Features
//!
//! - **Zero allocation while scheduling**: all hot state lives in one
//!   caller-provided [`Arena`] sized up-front
//! - **Helping joins**: waiting threads execute work instead of blocking,
//!   so nested submit-and-join cannot deadlock
//! - **Per-worker pipes**: owner pops newest (cache-hot), thieves steal
//!   oldest; stolen chunks re-split to keep everyone busy
//! - **Graceful degradation**: a full pipe runs the chunk inline on the
//!   submitting thread, so progress never depends on queue space
//!
//! ## Quick start
//!
//! ```no_run
//! use weft::{Arena, Profiling, Runtime, SchedulerConfig};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let mut rt = Runtime::new(SchedulerConfig::new(), Profiling::default()).unwrap();
//! rt.start(Arena::new(rt.needed_memory())).unwrap();
//!
//! let partials: Vec<AtomicU64> = (0..rt.num_threads()).map(|_| AtomicU64::new(0)).collect();
//! rt.run(1_000_000, 1024, |partition, worker_id| {
//!     let mut sum = 0u64;
//!     for i in partition.start..partition.end {
//!         sum += u64::from(i) + 1;
//!     }
//!     partials[worker_id as usize].fetch_add(sum, Ordering::Relaxed);
//! });
//! let total: u64 = partials.iter().map(|p| p.load(Ordering::Relaxed)).sum();
//! assert_eq!(total, 500_000_500_000);
//!
//! let arena = rt.stop(true).unwrap(); // reusable by a later start()
//! # drop(arena);
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   add ──split──▶ own pipe ◀─steal── other workers
//!                     │
//!   worker loop: pop front ─▶ steal backs ─▶ spin ─▶ park(semaphore)
//!                     │
//!   join: help-execute until run_count == 0
//! ```
//!
//! The scheduler is not a general work queue: items are always partitions of
//! a known integer range, there are no priorities, no preemption and no
//! fairness across task sets.

// Re-export core types
pub use weft_core::{
    constants, ConfigError, Partition, PlatformError, ProfilerFn, Profiling, SchedError,
    SchedResult,
};

// Re-export env utilities
pub use weft_core::env::{env_get, env_get_bool, env_get_opt};

// Re-export runtime types
pub use weft_runtime::{Arena, Runtime, Scheduler, SchedulerConfig, Task, TaskFn};
