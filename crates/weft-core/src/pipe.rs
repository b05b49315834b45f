//! Per-worker bounded deque ("pipe")
//!
//! Single writer, multiple reader: the owning worker pushes and pops at the
//! front, any other worker may steal from the back. Per-slot state flags act
//! as fine-grained locks that serialize the handoff of each slot between the
//! one writer and N readers, so no global mutex is needed. Not truly
//! lock-free: a reserved slot (`INVALID`) blocks the writer until its reader
//! publishes `CAN_WRITE` again.
//!
//! Capacity is a power of two (`2 << log2`), so slot indices are
//! `counter & mask` and the occupancy `write - read_count` stays correct
//! under 32-bit wraparound.
//!
//! The header and both slot arrays live in caller-provided memory
//! (`Pipe::init`); the scheduler places one pipe per worker inside its arena.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, Ordering};

/// Slot is empty, the owner may publish into it
pub const SLOT_CAN_WRITE: u32 = 0x0000_0000;
/// Slot is filled, any reader may try to consume it
pub const SLOT_CAN_READ: u32 = 0x1111_1111;
/// Slot is reserved: one reader won the CAS and has not yet released it
pub const SLOT_INVALID: u32 = 0xFFFF_FFFF;

/// Bounded single-owner deque over caller-provided storage.
///
/// The owner thread is the only caller of [`push`](Pipe::push) and
/// [`pop_front`](Pipe::pop_front); any thread may call
/// [`steal`](Pipe::steal) and [`is_empty`](Pipe::is_empty).
pub struct Pipe<T> {
    /// Owner-only write cursor; wrapping. Popping the front rolls it back,
    /// which is legal only because the owner is the sole writer.
    write: AtomicU32,
    /// Incremented by a thief after each successful back steal; wrapping
    read_count: AtomicU32,
    /// Owner-published front hint, used by thieves to restart their scan
    read: AtomicU32,
    mask: u32,
    buffer: *mut UnsafeCell<MaybeUninit<T>>,
    flags: *mut AtomicU32,
}

// Slots hand items across threads; the flag protocol provides the exclusion.
unsafe impl<T: Copy + Send> Send for Pipe<T> {}
unsafe impl<T: Copy + Send> Sync for Pipe<T> {}

impl<T: Copy> Pipe<T> {
    /// Capacity for a given log2 size: `2 << log2`, i.e. `2^(log2 + 1)`
    #[inline]
    pub const fn capacity_of(size_log2: u32) -> usize {
        2usize << size_log2
    }

    /// Construct a pipe in place over caller-provided slot storage.
    ///
    /// # Safety
    ///
    /// - `this` must be valid for writes of a `Pipe<T>`.
    /// - `buffer` and `flags` must each be valid for
    ///   `capacity_of(size_log2)` elements for the pipe's whole lifetime and
    ///   used by no one else.
    /// - `flags` must be zeroed (all slots `SLOT_CAN_WRITE`).
    /// - `size_log2 < 32`.
    pub unsafe fn init(
        this: *mut Self,
        buffer: *mut UnsafeCell<MaybeUninit<T>>,
        flags: *mut AtomicU32,
        size_log2: u32,
    ) {
        this.write(Pipe {
            write: AtomicU32::new(0),
            read_count: AtomicU32::new(0),
            read: AtomicU32::new(0),
            mask: (Self::capacity_of(size_log2) - 1) as u32,
            buffer,
            flags,
        });
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask as usize + 1
    }

    #[inline]
    fn flag(&self, index: usize) -> &AtomicU32 {
        unsafe { &*self.flags.add(index) }
    }

    #[inline]
    fn slot(&self, index: usize) -> *mut MaybeUninit<T> {
        unsafe { (*self.buffer.add(index)).get() }
    }

    /// Racy emptiness hint: `write - read_count == 0`. Safe to call from any
    /// thread; only a hint, used by wait loops and park rechecks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write
            .load(Ordering::Relaxed)
            .wrapping_sub(self.read_count.load(Ordering::Relaxed))
            == 0
    }

    /// Publish an item at the front. Returns `false` when the pipe is full
    /// (the writer has lapped the readers, or a thief still holds the oldest
    /// slot). Never spins; a full pipe is the caller's signal to run the
    /// item inline.
    ///
    /// # Safety
    ///
    /// Owner-only: must be called from the pipe's owning thread.
    pub unsafe fn push(&self, item: T) -> bool {
        let write_index = self.write.load(Ordering::Relaxed);
        let index = (write_index & self.mask) as usize;

        // A reader may still be draining this slot; Acquire pairs with its
        // releasing CAN_WRITE store so our overwrite cannot race its copy.
        if self.flag(index).load(Ordering::Acquire) != SLOT_CAN_WRITE {
            return false;
        }

        (*self.slot(index)).write(item);
        // Publish payload before the flag, flag before the cursor
        self.flag(index).store(SLOT_CAN_READ, Ordering::Release);
        self.write
            .store(write_index.wrapping_add(1), Ordering::Release);
        true
    }

    /// Pop the newest item (LIFO). Walks back from the write cursor,
    /// reserving a slot via CAS; a thief that overtakes the walk ends it.
    ///
    /// # Safety
    ///
    /// Owner-only: must be called from the pipe's owning thread.
    pub unsafe fn pop_front(&self) -> Option<T> {
        let write_index = self.write.load(Ordering::Relaxed);
        let mut front = write_index;

        loop {
            let read_count = self.read_count.load(Ordering::Relaxed);
            if write_index.wrapping_sub(read_count) == 0 || front == 0 {
                // Nothing left for us; refresh the thieves' scan hint
                self.read.store(read_count, Ordering::Relaxed);
                return None;
            }

            front = front.wrapping_sub(1);
            let index = (front & self.mask) as usize;
            if self
                .flag(index)
                .compare_exchange(
                    SLOT_CAN_READ,
                    SLOT_INVALID,
                    Ordering::Acquire,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                let item = (*self.slot(index)).assume_init();
                self.flag(index).store(SLOT_CAN_WRITE, Ordering::Release);
                // Roll the write cursor back over the consumed slot; only
                // the owner writes this cursor, so the plain store is safe.
                self.write
                    .store(write_index.wrapping_sub(1), Ordering::Release);
                return Some(item);
            } else if self.read.load(Ordering::Relaxed) >= front {
                // A thief has overtaken our walk
                return None;
            }
        }
    }

    /// Steal the oldest item (FIFO). Safe for any number of concurrent
    /// thieves and the owner.
    pub fn steal(&self) -> Option<T> {
        let mut read_count = self.read_count.load(Ordering::Relaxed);
        let mut to_use = read_count;

        loop {
            let write_index = self.write.load(Ordering::Acquire);
            if write_index.wrapping_sub(read_count) == 0 {
                return None;
            }

            // Lapped by other thieves: restart from the owner's hint
            if to_use >= write_index {
                to_use = self.read.load(Ordering::Relaxed);
            }

            let index = (to_use & self.mask) as usize;
            if self
                .flag(index)
                .compare_exchange(
                    SLOT_CAN_READ,
                    SLOT_INVALID,
                    Ordering::Acquire,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                // One item leaves the pipe; the CAS above keeps other
                // readers off this slot until we release it.
                self.read_count.fetch_add(1, Ordering::AcqRel);
                let item = unsafe { (*self.slot(index)).assume_init() };
                self.flag(index).store(SLOT_CAN_WRITE, Ordering::Release);
                return Some(item);
            }

            to_use = to_use.wrapping_add(1);
            read_count = self.read_count.load(Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    /// Leak-backed pipe for tests; the scheduler normally places pipes in
    /// its arena.
    fn new_pipe(size_log2: u32) -> &'static Pipe<u64> {
        let cap = Pipe::<u64>::capacity_of(size_log2);
        let buffer: &'static mut [UnsafeCell<MaybeUninit<u64>>] = Box::leak(
            (0..cap)
                .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        );
        let flags: &'static mut [AtomicU32] = Box::leak(
            (0..cap)
                .map(|_| AtomicU32::new(SLOT_CAN_WRITE))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        );
        let pipe: &'static mut MaybeUninit<Pipe<u64>> =
            Box::leak(Box::new(MaybeUninit::uninit()));
        unsafe {
            Pipe::init(
                pipe.as_mut_ptr(),
                buffer.as_mut_ptr(),
                flags.as_mut_ptr(),
                size_log2,
            );
            &*pipe.as_ptr()
        }
    }

    /// Start all three counters at `value` (state is equivalent to empty)
    fn wind_counters(pipe: &Pipe<u64>, value: u32) {
        pipe.write.store(value, Ordering::Relaxed);
        pipe.read_count.store(value, Ordering::Relaxed);
        pipe.read.store(value, Ordering::Relaxed);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(Pipe::<u64>::capacity_of(1), 4);
        assert_eq!(Pipe::<u64>::capacity_of(8), 512);
        assert_eq!(new_pipe(3).capacity(), 16);
    }

    #[test]
    fn test_push_pop_front_lifo() {
        let pipe = new_pipe(2);
        unsafe {
            assert!(pipe.push(1));
            assert!(pipe.push(2));
            assert!(pipe.push(3));
            assert_eq!(pipe.pop_front(), Some(3));
            assert_eq!(pipe.pop_front(), Some(2));
            assert_eq!(pipe.pop_front(), Some(1));
            assert_eq!(pipe.pop_front(), None);
        }
        assert!(pipe.is_empty());
    }

    #[test]
    fn test_steal_fifo() {
        let pipe = new_pipe(2);
        unsafe {
            assert!(pipe.push(1));
            assert!(pipe.push(2));
            assert!(pipe.push(3));
        }
        assert_eq!(pipe.steal(), Some(1));
        assert_eq!(pipe.steal(), Some(2));
        assert_eq!(pipe.steal(), Some(3));
        assert_eq!(pipe.steal(), None);
    }

    #[test]
    fn test_push_full_reports_overflow() {
        let pipe = new_pipe(1); // capacity 4
        unsafe {
            for i in 0..4 {
                assert!(pipe.push(i));
            }
            assert!(!pipe.push(99));
            // Draining one slot from the back makes room again
            assert_eq!(pipe.steal(), Some(0));
            assert!(pipe.push(99));
            assert!(!pipe.push(100));
        }
    }

    #[test]
    fn test_owner_and_thief_split_the_items() {
        let pipe = new_pipe(2);
        unsafe {
            for i in 0..6 {
                assert!(pipe.push(i));
            }
            // Thief takes the oldest, owner the newest
            assert_eq!(pipe.steal(), Some(0));
            assert_eq!(pipe.pop_front(), Some(5));
            assert_eq!(pipe.steal(), Some(1));
            assert_eq!(pipe.pop_front(), Some(4));
        }
        assert!(!pipe.is_empty());
    }

    #[test]
    fn test_counters_wrap_around() {
        let pipe = new_pipe(2);
        wind_counters(pipe, u32::MAX - 2);
        unsafe {
            for i in 0..6 {
                assert!(pipe.push(i), "push {} across the wrap", i);
            }
            assert!(!pipe.is_empty());
            assert_eq!(pipe.steal(), Some(0));
            assert_eq!(pipe.pop_front(), Some(5));
            assert_eq!(pipe.pop_front(), Some(4));
            assert_eq!(pipe.steal(), Some(1));
            assert_eq!(pipe.steal(), Some(2));
            assert_eq!(pipe.pop_front(), Some(3));
            assert_eq!(pipe.pop_front(), None);
            assert_eq!(pipe.steal(), None);
        }
        assert!(pipe.is_empty());
    }

    #[test]
    fn test_concurrent_thieves_take_each_item_once() {
        let pipe = new_pipe(8);
        let total = 400u64;
        unsafe {
            for i in 0..total {
                assert!(pipe.push(i));
            }
        }

        let sum = Arc::new(AtomicUsize::new(0));
        let count = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];
        for _ in 0..4 {
            let sum = Arc::clone(&sum);
            let count = Arc::clone(&count);
            let pipe: &'static Pipe<u64> = pipe;
            handles.push(thread::spawn(move || {
                while let Some(v) = pipe.steal() {
                    sum.fetch_add(v as usize, Ordering::Relaxed);
                    count.fetch_add(1, Ordering::Relaxed);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(count.load(Ordering::Relaxed), total as usize);
        let expected: usize = (0..total as usize).sum();
        assert_eq!(sum.load(Ordering::Relaxed), expected);
        assert!(pipe.is_empty());
    }

    #[test]
    fn test_owner_races_thieves() {
        use std::sync::atomic::AtomicBool;

        let pipe = new_pipe(4); // capacity 32
        let produced = 2000u64;

        let done = Arc::new(AtomicBool::new(false));
        let stolen = Arc::new(AtomicUsize::new(0));
        let mut thieves = vec![];
        for _ in 0..2 {
            let done = Arc::clone(&done);
            let stolen = Arc::clone(&stolen);
            let pipe: &'static Pipe<u64> = pipe;
            thieves.push(thread::spawn(move || {
                let mut sum = 0usize;
                loop {
                    match pipe.steal() {
                        Some(v) => sum += v as usize,
                        None => {
                            if done.load(Ordering::Acquire) && pipe.is_empty() {
                                break;
                            }
                            thread::yield_now();
                        }
                    }
                }
                stolen.fetch_add(sum, Ordering::Relaxed);
            }));
        }

        // Owner: interleave pushes and front pops; items the owner pops
        // itself are accounted locally.
        let mut local = 0usize;
        let mut pending = 0u64;
        unsafe {
            while pending < produced {
                if pipe.push(pending) {
                    pending += 1;
                } else if let Some(v) = pipe.pop_front() {
                    local += v as usize;
                }
                if pending % 7 == 0 {
                    if let Some(v) = pipe.pop_front() {
                        local += v as usize;
                    }
                }
            }
        }
        done.store(true, Ordering::Release);
        for h in thieves {
            h.join().unwrap();
        }
        // Anything the thieves left behind
        unsafe {
            while let Some(v) = pipe.pop_front() {
                local += v as usize;
            }
        }

        let expected: usize = (0..produced as usize).sum();
        assert_eq!(local + stolen.load(Ordering::Relaxed), expected);
    }
}
