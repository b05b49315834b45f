//! Linux futex-based counting semaphore
//!
//! The futex word is the permit count. `wait` consumes a permit via CAS or
//! sleeps while the word is zero; `signal(n)` adds `n` permits and wakes up
//! to `n` sleepers. The kernel re-checks the word under its own lock, so a
//! permit added between our load and the `FUTEX_WAIT` turns the sleep into
//! an immediate `EAGAIN` and the outer loop consumes it.

use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

/// Futex-backed counting semaphore
pub struct FutexSemaphore {
    /// Futex word: available permits
    permits: AtomicU32,
    /// Number of threads inside the kernel wait (wake-skip hint)
    waiters: AtomicU32,
}

impl FutexSemaphore {
    pub const fn new() -> Self {
        Self {
            permits: AtomicU32::new(0),
            waiters: AtomicU32::new(0),
        }
    }

    /// Block until a permit is available, then consume it.
    pub fn wait(&self) {
        loop {
            // Fast path: consume an available permit
            let mut current = self.permits.load(Ordering::Acquire);
            while current > 0 {
                match self.permits.compare_exchange_weak(
                    current,
                    current - 1,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return,
                    Err(actual) => current = actual,
                }
            }

            // No permits: sleep while the word is still zero. Spurious
            // returns and EAGAIN both re-enter the consume loop above.
            self.waiters.fetch_add(1, Ordering::SeqCst);
            unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    self.permits.as_ptr(),
                    libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                    0u32,
                    ptr::null::<libc::timespec>(),
                    ptr::null::<u32>(),
                    0u32,
                );
            }
            self.waiters.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Release `count` permits and wake up to `count` sleepers.
    pub fn signal(&self, count: u32) {
        if count == 0 {
            return;
        }
        self.permits.fetch_add(count, Ordering::SeqCst);
        if self.waiters.load(Ordering::SeqCst) > 0 {
            unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    self.permits.as_ptr(),
                    libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                    count.min(i32::MAX as u32) as i32,
                    ptr::null::<libc::timespec>(),
                    ptr::null::<u32>(),
                    0u32,
                );
            }
        }
    }
}

impl Default for FutexSemaphore {
    fn default() -> Self {
        Self::new()
    }
}
