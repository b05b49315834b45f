//! Error types for the weft scheduler
//!
//! Only setup and teardown can fail. The scheduling hot path (submit, steal,
//! run, join) is infallible by design: a full pipe degrades to inline
//! execution and a missed steal is just a retry.

use core::fmt;

/// Result type for scheduler operations
pub type SchedResult<T> = Result<T, SchedError>;

/// Errors that can occur in scheduler operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// Invalid configuration or arena, reported at init/start
    Config(ConfigError),

    /// Runtime is already started
    AlreadyStarted,

    /// Runtime has not been started
    NotStarted,

    /// OS primitive failure during start/stop
    Platform(PlatformError),
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::Config(e) => write!(f, "configuration error: {}", e),
            SchedError::AlreadyStarted => write!(f, "scheduler already started"),
            SchedError::NotStarted => write!(f, "scheduler not started"),
            SchedError::Platform(e) => write!(f, "platform failure: {}", e),
        }
    }
}

impl std::error::Error for SchedError {}

/// Configuration and arena errors (fatal, caught before any thread starts)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `threads` was explicitly set to zero
    ZeroThreads,

    /// More worker threads than the scheduler supports
    TooManyThreads,

    /// `pipe_size_log2` must stay below 32 so the 32-bit pipe counters work
    PipeSizeTooLarge,

    /// `max_initial_partitions` must be at least 1
    ZeroInitialPartitions,

    /// Arena smaller than the computed requirement
    ArenaTooSmall { needed: usize, got: usize },

    /// Arena block not aligned for the scheduler state
    ArenaMisaligned,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroThreads => write!(f, "thread count must be > 0"),
            ConfigError::TooManyThreads => write!(f, "thread count too large"),
            ConfigError::PipeSizeTooLarge => write!(f, "pipe_size_log2 must be < 32"),
            ConfigError::ZeroInitialPartitions => {
                write!(f, "max_initial_partitions must be > 0")
            }
            ConfigError::ArenaTooSmall { needed, got } => {
                write!(f, "arena too small: need {} bytes, got {}", needed, got)
            }
            ConfigError::ArenaMisaligned => write!(f, "arena misaligned"),
        }
    }
}

impl From<ConfigError> for SchedError {
    fn from(e: ConfigError) -> Self {
        SchedError::Config(e)
    }
}

/// OS primitive failures, surfaced only from start/stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Failed to spawn a worker thread
    ThreadSpawn,

    /// Scheduler state was still shared after all workers joined
    Teardown,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::ThreadSpawn => write!(f, "failed to spawn worker thread"),
            PlatformError::Teardown => write!(f, "scheduler state still referenced at teardown"),
        }
    }
}

impl From<PlatformError> for SchedError {
    fn from(e: PlatformError) -> Self {
        SchedError::Platform(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = SchedError::NotStarted;
        assert_eq!(format!("{}", e), "scheduler not started");

        let e = SchedError::Config(ConfigError::ArenaTooSmall { needed: 64, got: 8 });
        assert_eq!(
            format!("{}", e),
            "configuration error: arena too small: need 64 bytes, got 8"
        );
    }

    #[test]
    fn test_error_conversion() {
        let e: SchedError = ConfigError::PipeSizeTooLarge.into();
        assert!(matches!(e, SchedError::Config(ConfigError::PipeSizeTooLarge)));

        let e: SchedError = PlatformError::ThreadSpawn.into();
        assert!(matches!(e, SchedError::Platform(PlatformError::ThreadSpawn)));
    }
}
