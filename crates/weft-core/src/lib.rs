//! # weft-core
//!
//! Core types for the weft task scheduler.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! All platform-specific implementations are in `weft-runtime`.
//!
//! ## Modules
//!
//! - `pipe` - Per-worker bounded deque (owner front, thieves back)
//! - `partition` - Index-range type and splitting
//! - `profile` - Optional profiler callbacks
//! - `error` - Error types
//! - `env` - Environment variable utilities

pub mod env;
pub mod error;
pub mod partition;
pub mod pipe;
pub mod profile;

// Re-exports for convenience
pub use error::{ConfigError, PlatformError, SchedError, SchedResult};
pub use partition::Partition;
pub use pipe::Pipe;
pub use profile::{ProfilerFn, Profiling};

/// Scheduling constants
pub mod constants {
    /// Default per-worker pipe size as a log2 number.
    /// The resulting capacity is `2 << log2`; must stay below 32 so the
    /// 32-bit pipe counters cannot overflow their index space.
    pub const DEFAULT_PIPE_SIZE_LOG2: u32 = 8;

    /// Work-discovery misses before a worker parks on the semaphore
    pub const DEFAULT_SPIN_COUNT_MAX: u32 = 100;

    /// Pause iterations added per consecutive miss while spinning
    pub const DEFAULT_SPIN_BACKOFF_MUL: u32 = 10;

    /// Upper bound on the number of partitions created at submit time
    pub const DEFAULT_MAX_INITIAL_PARTITIONS: u32 = 8;

    /// Alignment of the arena block (and upper bound on any layout inside it)
    pub const CACHE_LINE_SIZE: usize = 64;
}
