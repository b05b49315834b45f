//! Counting semaphore for worker parking
//!
//! Workers park here when repeated work discovery misses; `add` signals
//! after publishing new subtasks. Created with zero permits. `signal(n)`
//! releases up to `n` parked workers at once, which the shutdown broadcast
//! relies on.
//!
//! The semaphore is const-constructible so the scheduler can place it
//! inside the arena. Platform-specific implementations use the most
//! efficient primitive available.

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexSemaphore as Semaphore;
    } else {
        mod portable;
        pub use portable::PortableSemaphore as Semaphore;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_signal_then_wait_does_not_block() {
        let sem = Semaphore::new();
        sem.signal(2);
        sem.wait();
        sem.wait();
    }

    #[test]
    fn test_signal_zero_is_noop() {
        let sem = Semaphore::new();
        sem.signal(0);
        sem.signal(1);
        sem.wait();
    }

    #[test]
    fn test_wait_blocks_until_signal() {
        let sem = Arc::new(Semaphore::new());
        let sem2 = Arc::clone(&sem);

        let handle = thread::spawn(move || {
            sem2.wait();
            true
        });

        // Give the thread time to park
        thread::sleep(Duration::from_millis(50));
        sem.signal(1);

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_signal_n_releases_n_waiters() {
        let sem = Arc::new(Semaphore::new());
        let released = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..3 {
            let sem = Arc::clone(&sem);
            let released = Arc::clone(&released);
            handles.push(thread::spawn(move || {
                sem.wait();
                released.fetch_add(1, Ordering::SeqCst);
            }));
        }

        thread::sleep(Duration::from_millis(50));
        sem.signal(3);

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(released.load(Ordering::SeqCst), 3);
    }
}
