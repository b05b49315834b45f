//! Thread-local worker identity
//!
//! Each worker thread stores its id here from the entry payload; the main
//! thread reads 0 without any setup. Submissions and joins use this to find
//! the calling thread's own pipe, so tasks can submit further tasks without
//! threading the id through user code. Identity is per OS thread, not per
//! scheduler; multiple runtimes can coexist because each worker thread
//! belongs to exactly one.

use std::cell::Cell;

thread_local! {
    /// Worker id of this OS thread (main thread stays 0)
    static WORKER_ID: Cell<u32> = const { Cell::new(0) };
}

/// Set the worker id for this thread (called once from the worker entry)
#[inline]
pub(crate) fn set_worker_id(id: u32) {
    WORKER_ID.with(|cell| cell.set(id));
}

/// Worker id of the calling thread; 0 outside of worker threads
#[inline]
pub fn worker_id() -> u32 {
    WORKER_ID.with(|cell| cell.get())
}
