//! Runtime configuration
//!
//! Compile-time defaults with runtime environment overrides.
//!
//! # Configuration priority (highest wins)
//!
//! 1. Builder methods
//! 2. Environment variables (`from_env`)
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_runtime::SchedulerConfig;
//!
//! // Defaults with env overrides
//! let config = SchedulerConfig::from_env();
//!
//! // Or customize programmatically
//! let config = SchedulerConfig::new().threads(4).pipe_size_log2(6);
//! ```

use weft_core::constants;
use weft_core::env::{env_get, env_get_bool, env_get_opt};
use weft_core::error::ConfigError;

/// Most worker threads a scheduler will run (including the main thread)
pub const MAX_THREADS: usize = 1024;

/// Scheduler configuration with builder pattern.
///
/// Use `from_env()` to start with library defaults and apply any
/// environment variable overrides.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of threads including the main thread; `None` means use the
    /// hardware concurrency
    pub threads: Option<usize>,
    /// Per-worker pipe size as a log2 number; capacity is `2 << log2`
    pub pipe_size_log2: u32,
    /// Work-discovery misses before a worker parks
    pub spin_count_max: u32,
    /// Pause iterations added per consecutive miss
    pub spin_backoff_mul: u32,
    /// Upper bound on partitions created at submit time
    pub max_initial_partitions: u32,
    /// Enable debug diagnostics on stderr
    pub debug: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfig {
    /// Library defaults, no env overrides. Useful for tests or when you
    /// want full control.
    pub fn new() -> Self {
        Self {
            threads: None,
            pipe_size_log2: constants::DEFAULT_PIPE_SIZE_LOG2,
            spin_count_max: constants::DEFAULT_SPIN_COUNT_MAX,
            spin_backoff_mul: constants::DEFAULT_SPIN_BACKOFF_MUL,
            max_initial_partitions: constants::DEFAULT_MAX_INITIAL_PARTITIONS,
            debug: false,
        }
    }

    /// Defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `WEFT_THREADS` - thread count including main
    /// - `WEFT_PIPE_SIZE_LOG2` - pipe capacity as log2
    /// - `WEFT_SPIN_COUNT_MAX` - misses before parking
    /// - `WEFT_SPIN_BACKOFF_MUL` - backoff multiplier
    /// - `WEFT_MAX_INITIAL_PARTITIONS` - submit-time partition cap
    /// - `WEFT_DEBUG` - debug diagnostics (0/1)
    pub fn from_env() -> Self {
        Self {
            threads: env_get_opt("WEFT_THREADS"),
            pipe_size_log2: env_get("WEFT_PIPE_SIZE_LOG2", constants::DEFAULT_PIPE_SIZE_LOG2),
            spin_count_max: env_get("WEFT_SPIN_COUNT_MAX", constants::DEFAULT_SPIN_COUNT_MAX),
            spin_backoff_mul: env_get(
                "WEFT_SPIN_BACKOFF_MUL",
                constants::DEFAULT_SPIN_BACKOFF_MUL,
            ),
            max_initial_partitions: env_get(
                "WEFT_MAX_INITIAL_PARTITIONS",
                constants::DEFAULT_MAX_INITIAL_PARTITIONS,
            ),
            debug: env_get_bool("WEFT_DEBUG", false),
        }
    }

    // Builder methods

    pub fn threads(mut self, n: usize) -> Self {
        self.threads = Some(n);
        self
    }

    pub fn pipe_size_log2(mut self, log2: u32) -> Self {
        self.pipe_size_log2 = log2;
        self
    }

    pub fn spin_count_max(mut self, n: u32) -> Self {
        self.spin_count_max = n;
        self
    }

    pub fn spin_backoff_mul(mut self, n: u32) -> Self {
        self.spin_backoff_mul = n;
        self
    }

    pub fn max_initial_partitions(mut self, n: u32) -> Self {
        self.max_initial_partitions = n;
        self
    }

    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Validate configuration and return an error if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.threads {
            Some(0) => return Err(ConfigError::ZeroThreads),
            Some(n) if n > MAX_THREADS => return Err(ConfigError::TooManyThreads),
            _ => {}
        }
        if self.pipe_size_log2 >= 32 {
            return Err(ConfigError::PipeSizeTooLarge);
        }
        if self.max_initial_partitions == 0 {
            return Err(ConfigError::ZeroInitialPartitions);
        }
        Ok(())
    }

    /// Thread count to run with: the explicit setting, or the hardware
    /// concurrency when unset.
    pub(crate) fn resolved_threads(&self) -> usize {
        match self.threads {
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(MAX_THREADS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SchedulerConfig::new();
        assert!(config.validate().is_ok());
        assert!(config.resolved_threads() >= 1);
    }

    #[test]
    fn test_builder() {
        let config = SchedulerConfig::new()
            .threads(8)
            .pipe_size_log2(4)
            .spin_count_max(10)
            .debug(true);
        assert_eq!(config.threads, Some(8));
        assert_eq!(config.pipe_size_log2, 4);
        assert_eq!(config.spin_count_max, 10);
        assert!(config.debug);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert_eq!(
            SchedulerConfig::new().threads(0).validate(),
            Err(ConfigError::ZeroThreads)
        );
        assert_eq!(
            SchedulerConfig::new().threads(MAX_THREADS + 1).validate(),
            Err(ConfigError::TooManyThreads)
        );
        assert_eq!(
            SchedulerConfig::new().pipe_size_log2(32).validate(),
            Err(ConfigError::PipeSizeTooLarge)
        );
        assert_eq!(
            SchedulerConfig::new().max_initial_partitions(0).validate(),
            Err(ConfigError::ZeroInitialPartitions)
        );
        // Boundary: 31 is the largest legal log2
        assert!(SchedulerConfig::new().pipe_size_log2(31).validate().is_ok());
    }
}
