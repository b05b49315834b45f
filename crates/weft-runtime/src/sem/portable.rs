//! Portable counting semaphore using std::sync::Condvar
//!
//! Used on platforms without futex support. Less efficient but correct.

use std::sync::{Condvar, Mutex};

/// Condvar-backed counting semaphore (fallback)
pub struct PortableSemaphore {
    permits: Mutex<u32>,
    cond: Condvar,
}

impl PortableSemaphore {
    pub const fn new() -> Self {
        Self {
            permits: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// Block until a permit is available, then consume it.
    pub fn wait(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.cond.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    /// Release `count` permits and wake up to `count` sleepers.
    pub fn signal(&self, count: u32) {
        if count == 0 {
            return;
        }
        {
            let mut permits = self.permits.lock().unwrap();
            *permits += count;
        }
        if count == 1 {
            self.cond.notify_one();
        } else {
            self.cond.notify_all();
        }
    }
}

impl Default for PortableSemaphore {
    fn default() -> Self {
        Self::new()
    }
}
