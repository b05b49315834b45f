//! Worker thread pool
//!
//! Spawns the named OS threads that run the scheduler loop and joins them
//! at shutdown. The entry payload (worker id plus the shared scheduler)
//! moves by value into each thread's closure.

use std::thread::{self, JoinHandle};

use weft_core::error::PlatformError;

/// Join handles for the spawned workers (ids `1..threads`; the main thread
/// is worker 0 and spawns nothing).
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity.saturating_sub(1)),
        }
    }

    /// Spawn one worker thread. On failure the pool keeps the workers
    /// spawned so far; the caller shuts them down and joins.
    pub fn spawn<F>(&mut self, worker_id: u32, f: F) -> Result<(), PlatformError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("weft-worker-{}", worker_id))
            .spawn(f)
            .map_err(|_| PlatformError::ThreadSpawn)?;
        self.handles.push(handle);
        Ok(())
    }

    /// Wait for every worker to finish
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
