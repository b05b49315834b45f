//! Task set and pipe payload types
//!
//! A `Task` describes one data-parallel submission: a callable plus the
//! index range `[0, size)`. The scheduler splits the range into `Subtask`s
//! (the pipe slot payload) and tracks completion through the task's
//! outstanding-work counter.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicI32, Ordering};

use weft_core::Partition;

use crate::scheduler::Scheduler;

/// Task callable: receives the submission's userdata, the scheduler (for
/// braided submission), the subrange to process and the executing worker id.
pub type TaskFn = fn(userdata: *mut c_void, sched: &Scheduler, partition: Partition, worker_id: u32);

fn exec_unset(_: *mut c_void, _: &Scheduler, _: Partition, _: u32) {}

/// One data-parallel task set.
///
/// Caller-owned: the scheduler only borrows it through pipe slots. A task
/// handed to [`Scheduler::add`] must stay at a stable address and live until
/// [`done`](Task::done) reports true (a helping [`Scheduler::join`]
/// guarantees that).
pub struct Task {
    pub(crate) userdata: *mut c_void,
    pub(crate) exec: TaskFn,
    pub(crate) size: u32,
    pub(crate) min_range: u32,
    /// Steal-time quantum, derived at submit: `max(min_range, size / partitions)`
    pub(crate) range_to_run: u32,
    /// Outstanding-work counter; the task is complete iff zero. Biased to
    /// -1 during the enqueue window so a consumer racing the enqueue can
    /// never observe a transient zero.
    pub(crate) run_count: AtomicI32,
}

// Subtasks carry `*const Task` across worker threads; userdata safety is the
// caller's contract, exactly as with the profiler hooks.
unsafe impl Send for Task {}
unsafe impl Sync for Task {}

impl Task {
    /// Fresh, never-submitted task; `done()` reports true.
    pub fn new() -> Self {
        Task {
            userdata: ptr::null_mut(),
            exec: exec_unset,
            size: 0,
            min_range: 0,
            range_to_run: 0,
            run_count: AtomicI32::new(0),
        }
    }

    /// Completion predicate: no outstanding subranges.
    ///
    /// Racy outside of `join`: a true result is final, but new submissions
    /// of the same task reset it.
    #[inline]
    pub fn done(&self) -> bool {
        self.run_count.load(Ordering::Acquire) == 0
    }

    /// Normalized range size of the last submission
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Normalized grain of the last submission
    #[inline]
    pub fn min_range(&self) -> u32 {
        self.min_range
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// One contiguous subrange of a task: the quantum of work in a pipe slot.
/// Copied by value into and out of slots.
#[derive(Clone, Copy)]
pub(crate) struct Subtask {
    pub task: *const Task,
    pub partition: Partition,
}

// Slot payloads move between worker threads by design
unsafe impl Send for Subtask {}
