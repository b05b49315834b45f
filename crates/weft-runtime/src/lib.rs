//! # weft-runtime
//!
//! Platform layer and scheduler core for weft.
//!
//! ## Modules
//!
//! - `arena` - Single caller-provided memory block holding all hot state
//! - `config` - Runtime configuration with env overrides
//! - `scheduler` - Scheduler core, worker loop and the `Runtime` owner
//! - `sem` - Counting semaphore (futex on Linux, condvar fallback)
//! - `task` - Task set and pipe payload types
//! - `tls` - Thread-local worker identity

pub mod arena;
pub mod config;
pub mod scheduler;
pub mod sem;
pub mod task;
pub mod tls;

mod worker;

// Re-exports for convenience
pub use arena::Arena;
pub use config::SchedulerConfig;
pub use scheduler::{Runtime, Scheduler};
pub use task::{Task, TaskFn};
