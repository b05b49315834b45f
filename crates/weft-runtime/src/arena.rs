//! Arena: one caller-provided memory block for all hot scheduler state
//!
//! Everything the hot path touches (pipe headers, slot buffers, slot flags,
//! the semaphore) lives in a single zeroed allocation sized up-front, so
//! scheduling itself never allocates. The block's byte count comes from
//! `SchedLayout::compute`; the caller allocates once and can reuse the block
//! across start/stop cycles.

use core::alloc::Layout;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr::NonNull;
use core::sync::atomic::AtomicU32;

use weft_core::constants::CACHE_LINE_SIZE;
use weft_core::error::ConfigError;
use weft_core::pipe::Pipe;

use crate::sem::Semaphore;
use crate::task::Subtask;

/// One zeroed, cache-line-aligned allocation owned by the caller.
///
/// `Arena::new` is the only allocation a scheduler ever requires for its
/// hot state; `Runtime::stop` hands the arena back for reuse.
pub struct Arena {
    ptr: NonNull<u8>,
    layout: Layout,
}

// The arena is the sole owner of its block; sharing happens only through
// the scheduler's pointers, whose synchronization the pipes provide.
unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl Arena {
    /// Allocate a zeroed block of at least `size` bytes, cache-line
    /// aligned.
    ///
    /// # Panics
    ///
    /// Panics if `size` cannot be laid out (overflows when padded), and
    /// aborts through `handle_alloc_error` if the allocation fails.
    pub fn new(size: usize) -> Arena {
        let layout = Layout::from_size_align(size.max(1), CACHE_LINE_SIZE)
            .expect("arena size overflows layout");
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(ptr) else {
            std::alloc::handle_alloc_error(layout);
        };
        Arena { ptr, layout }
    }

    /// Usable size in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    #[inline]
    pub(crate) fn base(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Clear the block; called on every start so a reused arena begins from
    /// the all-slots-empty state the pipe protocol requires.
    pub(crate) fn zero(&mut self) {
        unsafe { core::ptr::write_bytes(self.ptr.as_ptr(), 0, self.layout.size()) };
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        unsafe { std::alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

/// Offsets of the scheduler's arena regions.
///
/// Region order matches the submit/steal access pattern: pipe headers
/// first, then per-pipe slot buffers, per-pipe slot flags, and the
/// semaphore at the tail.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SchedLayout {
    /// Offset of `[Pipe<Subtask>; threads]`
    pub pipes: usize,
    /// Offset of `[Subtask; threads * capacity]`
    pub buffers: usize,
    /// Offset of `[AtomicU32; threads * capacity]`
    pub flags: usize,
    /// Offset of the semaphore
    pub semaphore: usize,
    size: usize,
    align: usize,
}

impl SchedLayout {
    /// Compute the arena layout for `threads` pipes of capacity
    /// `2 << pipe_size_log2`.
    pub fn compute(threads: usize, pipe_size_log2: u32) -> Result<SchedLayout, ConfigError> {
        let capacity = Pipe::<Subtask>::capacity_of(pipe_size_log2);
        let slots = threads
            .checked_mul(capacity)
            .ok_or(ConfigError::PipeSizeTooLarge)?;

        let pipes = Layout::array::<Pipe<Subtask>>(threads)
            .map_err(|_| ConfigError::PipeSizeTooLarge)?;
        let buffers = Layout::array::<UnsafeCell<MaybeUninit<Subtask>>>(slots)
            .map_err(|_| ConfigError::PipeSizeTooLarge)?;
        let flags = Layout::array::<AtomicU32>(slots).map_err(|_| ConfigError::PipeSizeTooLarge)?;
        let semaphore = Layout::new::<Semaphore>();

        let (layout, buffers_off) = pipes
            .extend(buffers)
            .map_err(|_| ConfigError::PipeSizeTooLarge)?;
        let (layout, flags_off) = layout
            .extend(flags)
            .map_err(|_| ConfigError::PipeSizeTooLarge)?;
        let (layout, sem_off) = layout
            .extend(semaphore)
            .map_err(|_| ConfigError::PipeSizeTooLarge)?;
        let layout = layout.pad_to_align();

        debug_assert!(layout.align() <= CACHE_LINE_SIZE);
        Ok(SchedLayout {
            pipes: 0,
            buffers: buffers_off,
            flags: flags_off,
            semaphore: sem_off,
            size: layout.size(),
            align: layout.align(),
        })
    }

    /// Total bytes required
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Required base alignment
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_alloc_zeroed() {
        let arena = Arena::new(256);
        assert!(arena.len() >= 256);
        let base = arena.base();
        for i in 0..256 {
            assert_eq!(unsafe { *base.add(i) }, 0);
        }
        assert_eq!(base as usize % CACHE_LINE_SIZE, 0);
    }

    #[test]
    fn test_arena_zero_clears() {
        let mut arena = Arena::new(64);
        unsafe { *arena.base() = 0xAB };
        arena.zero();
        assert_eq!(unsafe { *arena.base() }, 0);
    }

    #[test]
    fn test_layout_grows_with_threads_and_capacity() {
        let a = SchedLayout::compute(1, 4).unwrap();
        let b = SchedLayout::compute(4, 4).unwrap();
        let c = SchedLayout::compute(4, 6).unwrap();
        assert!(a.size() > 0);
        assert!(b.size() > a.size());
        assert!(c.size() > b.size());
    }

    #[test]
    fn test_layout_regions_are_ordered() {
        let l = SchedLayout::compute(3, 5).unwrap();
        assert!(l.pipes < l.buffers);
        assert!(l.buffers < l.flags);
        assert!(l.flags < l.semaphore);
        assert!(l.semaphore < l.size());
        assert!(l.align() <= CACHE_LINE_SIZE);
    }
}
