//! Optional profiler callbacks
//!
//! Four hook slots invoked on worker start, worker stop, wait-begin and
//! wait-end. Hooks must be re-entrant-safe and non-blocking; unset slots
//! cost a branch.

use core::ffi::c_void;
use core::ptr;

/// Profiler callback: receives the user pointer and the worker id
pub type ProfilerFn = fn(userdata: *mut c_void, worker_id: u32);

/// Profiler hook set. `Default` leaves every slot empty.
#[derive(Clone, Copy)]
pub struct Profiling {
    /// Passed to every callback
    pub userdata: *mut c_void,
    /// Called as soon as a worker thread starts
    pub thread_start: Option<ProfilerFn>,
    /// Called when a worker thread is about to exit
    pub thread_stop: Option<ProfilerFn>,
    /// Called when a worker begins waiting for work
    pub wait_start: Option<ProfilerFn>,
    /// Called when a worker is woken up
    pub wait_stop: Option<ProfilerFn>,
}

// The hooks are called from worker threads; the userdata contract is the
// caller's (same rule as task userdata).
unsafe impl Send for Profiling {}
unsafe impl Sync for Profiling {}

impl Default for Profiling {
    fn default() -> Self {
        Profiling {
            userdata: ptr::null_mut(),
            thread_start: None,
            thread_stop: None,
            wait_start: None,
            wait_stop: None,
        }
    }
}

impl Profiling {
    #[inline]
    fn call(&self, hook: Option<ProfilerFn>, worker_id: u32) {
        if let Some(f) = hook {
            f(self.userdata, worker_id);
        }
    }

    #[inline]
    pub fn on_thread_start(&self, worker_id: u32) {
        self.call(self.thread_start, worker_id);
    }

    #[inline]
    pub fn on_thread_stop(&self, worker_id: u32) {
        self.call(self.thread_stop, worker_id);
    }

    #[inline]
    pub fn on_wait_start(&self, worker_id: u32) {
        self.call(self.wait_start, worker_id);
    }

    #[inline]
    pub fn on_wait_stop(&self, worker_id: u32) {
        self.call(self.wait_stop, worker_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static HITS: AtomicU32 = AtomicU32::new(0);

    fn count_hook(_userdata: *mut c_void, worker_id: u32) {
        HITS.fetch_add(worker_id, Ordering::Relaxed);
    }

    #[test]
    fn test_unset_hooks_are_noops() {
        let p = Profiling::default();
        p.on_thread_start(1);
        p.on_thread_stop(1);
        p.on_wait_start(1);
        p.on_wait_stop(1);
    }

    #[test]
    fn test_set_hooks_fire() {
        let p = Profiling {
            thread_start: Some(count_hook),
            wait_stop: Some(count_hook),
            ..Profiling::default()
        };
        HITS.store(0, Ordering::Relaxed);
        p.on_thread_start(3);
        p.on_wait_stop(4);
        p.on_thread_stop(100); // unset, ignored
        assert_eq!(HITS.load(Ordering::Relaxed), 7);
    }
}
