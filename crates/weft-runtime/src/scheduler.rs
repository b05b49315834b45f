//! Scheduler core and runtime owner
//!
//! The `Scheduler` is the shared state every thread works against: the
//! per-worker pipes in the arena, the wake semaphore, the stop latch and
//! the counters the wait loops read. Worker threads and task callables see
//! it as `&Scheduler`; the `Runtime` owns the `Arc` plus the thread pool
//! and drives the lifecycle (start, stop, restart with the same arena).
//!
//! Work distribution: `add` splits the submitted range into subtasks on the
//! calling thread's own pipe (running overflow inline), workers pop their
//! own front and steal other backs with a rotating scan hint, and a stolen
//! chunk bigger than the task's steal quantum is split again before it
//! runs. Waiting always helps: `join` executes other work instead of
//! blocking, which is what makes submitting and joining from inside a task
//! safe.

use core::cell::UnsafeCell;
use core::ffi::c_void;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

use weft_core::error::{ConfigError, PlatformError, SchedError, SchedResult};
use weft_core::pipe::Pipe;
use weft_core::{Partition, Profiling};

use crate::arena::{Arena, SchedLayout};
use crate::config::SchedulerConfig;
use crate::sem::Semaphore;
use crate::task::{Subtask, Task, TaskFn};
use crate::tls;
use crate::worker::WorkerPool;

/// Shared scheduler state.
///
/// Everything here is `&self`: submission, helping joins and draining are
/// reentrant from inside a task callable (braided parallelism). Lifecycle
/// operations live on [`Runtime`].
pub struct Scheduler {
    /// `[Pipe<Subtask>; threads_num]` inside the arena
    pipes: NonNull<Pipe<Subtask>>,
    threads_num: u32,
    /// Steal-granularity divisor: `T * (T - 1)`, or 1 single-threaded
    partitions_num: u32,
    /// Submit-granularity divisor: `min(T - 1, max_initial_partitions)`
    partitions_init_num: u32,
    spin_count_max: u32,
    spin_backoff_mul: u32,
    /// One-way 1 -> 0 stop latch
    running: AtomicI32,
    /// Live threads including main; workers increment at entry
    thread_running: AtomicI32,
    /// Threads currently parked on (or entering) the semaphore
    thread_waiting: AtomicI32,
    /// Signalled after submissions; workers park here
    semaphore: NonNull<Semaphore>,
    profiling: Profiling,
    debug: bool,
    /// Owns the block `pipes` and `semaphore` point into
    arena: Arena,
}

// All shared state is atomics or flag-protocol pipe slots; the arena block
// never moves while the Arc lives.
unsafe impl Send for Scheduler {}
unsafe impl Sync for Scheduler {}

impl Scheduler {
    /// Lay the pipes and semaphore into the zeroed arena and assemble the
    /// shared state. `arena` must already be validated against `layout`.
    fn create(
        config: &SchedulerConfig,
        threads_num: u32,
        layout: &SchedLayout,
        profiling: Profiling,
        arena: Arena,
    ) -> Arc<Scheduler> {
        let base = arena.base();
        let capacity = Pipe::<Subtask>::capacity_of(config.pipe_size_log2);

        let pipes = unsafe { base.add(layout.pipes) } as *mut Pipe<Subtask>;
        let buffers =
            unsafe { base.add(layout.buffers) } as *mut UnsafeCell<MaybeUninit<Subtask>>;
        let flags = unsafe { base.add(layout.flags) } as *mut AtomicU32;
        for i in 0..threads_num as usize {
            // Flags are zeroed (all CAN_WRITE) courtesy of the zeroed arena
            unsafe {
                Pipe::init(
                    pipes.add(i),
                    buffers.add(i * capacity),
                    flags.add(i * capacity),
                    config.pipe_size_log2,
                );
            }
        }

        let semaphore = unsafe { base.add(layout.semaphore) } as *mut Semaphore;
        unsafe { ptr::write(semaphore, Semaphore::new()) };

        let (partitions_num, partitions_init_num) = if threads_num > 1 {
            (
                threads_num * (threads_num - 1),
                (threads_num - 1).min(config.max_initial_partitions),
            )
        } else {
            (1, 1)
        };

        // Both pointers are offsets from the arena base, never null
        Arc::new(Scheduler {
            pipes: unsafe { NonNull::new_unchecked(pipes) },
            threads_num,
            partitions_num,
            partitions_init_num,
            spin_count_max: config.spin_count_max,
            spin_backoff_mul: config.spin_backoff_mul,
            running: AtomicI32::new(1),
            thread_running: AtomicI32::new(1),
            thread_waiting: AtomicI32::new(0),
            semaphore: unsafe { NonNull::new_unchecked(semaphore) },
            profiling,
            debug: config.debug,
            arena,
        })
    }

    /// Destroy the in-arena semaphore and hand the block back
    fn into_arena(self) -> Arena {
        unsafe { ptr::drop_in_place(self.semaphore.as_ptr()) };
        self.arena
    }

    #[inline]
    fn pipe(&self, index: u32) -> &Pipe<Subtask> {
        debug_assert!(index < self.threads_num);
        unsafe { &*self.pipes.as_ptr().add(index as usize) }
    }

    #[inline]
    fn semaphore(&self) -> &Semaphore {
        unsafe { self.semaphore.as_ref() }
    }

    /// Threads this scheduler runs with, including the main thread
    #[inline]
    pub fn num_threads(&self) -> u32 {
        self.threads_num
    }

    /// Steal-granularity divisor (`T * (T - 1)`, or 1 single-threaded)
    #[inline]
    pub fn num_partitions(&self) -> u32 {
        self.partitions_num
    }

    /// True until stop is requested
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) != 0
    }

    /// Threads currently parked waiting for work (diagnostic)
    #[inline]
    pub fn num_waiting(&self) -> i32 {
        self.thread_waiting.load(Ordering::Acquire)
    }

    /// Live threads including main (diagnostic)
    #[inline]
    pub fn num_running(&self) -> i32 {
        self.thread_running.load(Ordering::Acquire)
    }

    /// Release every currently-parked worker
    fn wake_threads(&self) {
        let waiting = self.thread_waiting.load(Ordering::Acquire);
        if waiting > 0 {
            self.semaphore().signal(waiting as u32);
        }
    }

    /// Split `remainder` into `range_to_split` chunks on the calling
    /// thread's own pipe. A chunk that does not fit is executed inline
    /// (clamped to the task's steal quantum when that is finer) after
    /// waking workers for the chunks already published. `bias` cancels the
    /// submit-time `-1` (1 from `add`, 0 from steal re-splits).
    ///
    /// Safety: `remainder.task` must be live; caller is the pipe owner.
    unsafe fn split_add(
        &self,
        thread_num: u32,
        remainder: &mut Subtask,
        range_to_split: u32,
        bias: i32,
    ) {
        let task = &*remainder.task;
        let pipe = self.pipe(thread_num);
        let mut published: i32 = 0;

        while !remainder.partition.is_empty() {
            let chunk = Subtask {
                task: remainder.task,
                partition: remainder.partition.split_off(range_to_split),
            };
            published += 1;
            if !pipe.push(chunk) {
                // Pipe full: run this chunk here. Anything already
                // published is real work for the others, so wake them
                // before going heads-down.
                if published > 1 {
                    self.wake_threads();
                }
                let mut part = chunk.partition;
                if task.range_to_run < range_to_split {
                    // Only take one steal quantum inline; give the tail
                    // back to the remainder
                    part.end = part.start + task.range_to_run;
                    remainder.partition.start = part.end;
                }
                (task.exec)(task.userdata, self, part, thread_num);
                published -= 1;
            }
        }

        task.run_count.fetch_add(published + bias, Ordering::AcqRel);
        self.wake_threads();
    }

    /// Find and execute one subtask: own pipe front first (LIFO,
    /// cache-hot), then the other pipes' backs starting at the scan hint.
    /// A stolen chunk larger than the task's steal quantum is split again,
    /// the remainder going onto the calling thread's own pipe.
    pub(crate) fn try_running_task(&self, thread_num: u32, pipe_hint: &mut u32) -> bool {
        let mut found = unsafe { self.pipe(thread_num).pop_front() };

        let mut thread_to_check = *pipe_hint;
        let mut check_count = 0;
        while found.is_none() && check_count < self.threads_num {
            thread_to_check = (*pipe_hint + check_count) % self.threads_num;
            if thread_to_check != thread_num {
                found = self.pipe(thread_to_check).steal();
            }
            check_count += 1;
        }

        let Some(mut subtask) = found else {
            return false;
        };
        // Preserved unless the task actually came from another pipe
        *pipe_hint = thread_to_check;

        let task = unsafe { &*subtask.task };
        if task.range_to_run < subtask.partition.len() {
            let quantum = Subtask {
                task: subtask.task,
                partition: subtask.partition.split_off(task.range_to_run),
            };
            unsafe { self.split_add(thread_num, &mut subtask, task.range_to_run, 0) };
            (task.exec)(task.userdata, self, quantum.partition, thread_num);
        } else {
            // Already sized by add, just run it
            (task.exec)(task.userdata, self, subtask.partition, thread_num);
        }
        task.run_count.fetch_sub(1, Ordering::AcqRel);
        true
    }

    /// Park on the semaphore after a final rescan of all pipes. The
    /// waiting count goes up before the rescan: a submitter that published
    /// after our scan sees the count and signals, so either we see its
    /// write here or its signal releases the park.
    fn wait_for_work(&self, thread_num: u32) {
        self.thread_waiting.fetch_add(1, Ordering::SeqCst);

        let mut have_tasks = false;
        for i in 0..self.threads_num {
            if !self.pipe(i).is_empty() {
                have_tasks = true;
                break;
            }
        }
        if !have_tasks {
            self.profiling.on_wait_start(thread_num);
            if self.debug {
                eprintln!("[weft-worker-{}] parking", thread_num);
            }
            self.semaphore().wait();
            if self.debug {
                eprintln!("[weft-worker-{}] woken", thread_num);
            }
            self.profiling.on_wait_stop(thread_num);
        }

        self.thread_waiting.fetch_sub(1, Ordering::SeqCst);
    }

    /// Submit a task set covering `[0, size)`.
    ///
    /// Splits the range into chunks of `max(min_range, size /
    /// partitions_init_num)` on the calling thread's own pipe and wakes
    /// parked workers. Chunks that do not fit run inline right here, so
    /// submission always makes progress. Returns immediately; completion is
    /// observed through [`join`](Scheduler::join) or [`Task::done`].
    ///
    /// `size` and `min_range` are normalized to at least 1.
    ///
    /// # Safety
    ///
    /// - `task` must stay at a stable address and must not be dropped or
    ///   resubmitted until it reports done.
    /// - Must be called from the main thread or from inside a task
    ///   callable (pipe ownership).
    /// - `userdata` must be safe to share with every worker thread for the
    ///   task's lifetime.
    pub unsafe fn add(
        &self,
        task: &mut Task,
        exec: TaskFn,
        userdata: *mut c_void,
        size: u32,
        min_range: u32,
    ) {
        let task = task as *mut Task;
        (*task).userdata = userdata;
        (*task).exec = exec;
        (*task).size = size.max(1);
        (*task).min_range = min_range.max(1);
        // Bias: consumers may start (and finish) subtasks while we are
        // still splitting; the -1 keeps run_count negative until the final
        // fetch_add settles the real count.
        (*task).run_count.store(-1, Ordering::Release);
        (*task).range_to_run = ((*task).size / self.partitions_num).max((*task).min_range);

        let range_to_split = ((*task).size / self.partitions_init_num).max((*task).min_range);

        let mut remainder = Subtask {
            task,
            partition: Partition::new(0, (*task).size),
        };
        self.split_add(tls::worker_id(), &mut remainder, range_to_split, 1);
    }

    /// Wait for `task` to complete, executing available work while
    /// waiting. Never parks: the caller donates cycles instead of
    /// blocking, so joining from inside another task's callable cannot
    /// deadlock. Joining an already-complete task returns immediately.
    pub fn join(&self, task: &Task) {
        let thread_num = tls::worker_id();
        let mut pipe_hint = thread_num + 1;
        while task.run_count.load(Ordering::Acquire) != 0 {
            self.try_running_task(thread_num, &mut pipe_hint);
        }
    }

    /// Execute at most one available subtask; returns whether one ran
    pub fn try_run_task(&self) -> bool {
        let thread_num = tls::worker_id();
        let mut pipe_hint = thread_num + 1;
        self.try_running_task(thread_num, &mut pipe_hint)
    }

    /// Drain: execute work until every pipe is empty and no other thread
    /// is busy. Best-effort under continuous submission from other
    /// threads.
    pub fn wait(&self) {
        let thread_num = tls::worker_id();
        let mut pipe_hint = thread_num + 1;
        let mut have_task = true;
        while have_task
            || self.thread_waiting.load(Ordering::Acquire)
                < self.thread_running.load(Ordering::Acquire) - 1
        {
            self.try_running_task(thread_num, &mut pipe_hint);
            have_task = false;
            for i in 0..self.threads_num {
                if !self.pipe(i).is_empty() {
                    have_task = true;
                    break;
                }
            }
        }
    }

    /// Submit `[0, size)` against a borrowed closure and help until it
    /// completes. The safe counterpart of [`add`](Scheduler::add): the
    /// task lives on this stack frame and the join keeps it (and the
    /// closure) alive past the last subtask. The closure also receives the
    /// scheduler, so it can submit and join nested work (braided
    /// parallelism).
    ///
    /// The closure must not panic; unwinding out of a worker aborts the
    /// join protocol.
    pub fn run_with<F>(&self, size: u32, min_range: u32, f: F)
    where
        F: Fn(&Scheduler, Partition, u32) + Sync,
    {
        fn trampoline<F>(userdata: *mut c_void, sched: &Scheduler, partition: Partition, worker_id: u32)
        where
            F: Fn(&Scheduler, Partition, u32) + Sync,
        {
            let f = unsafe { &*(userdata as *const F) };
            f(sched, partition, worker_id);
        }

        let mut task = Task::new();
        unsafe {
            self.add(
                &mut task,
                trampoline::<F>,
                &f as *const F as *mut c_void,
                size,
                min_range,
            );
        }
        self.join(&task);
    }

    /// [`run_with`](Scheduler::run_with) without the scheduler argument
    pub fn run<F>(&self, size: u32, min_range: u32, f: F)
    where
        F: Fn(Partition, u32) + Sync,
    {
        self.run_with(size, min_range, |_, partition, worker_id| {
            f(partition, worker_id)
        });
    }
}

/// Worker thread entry: spin for work, back off on misses, park after too
/// many, exit when the stop latch drops.
fn worker_main(worker_id: u32, sched: Arc<Scheduler>) {
    tls::set_worker_id(worker_id);
    sched.thread_running.fetch_add(1, Ordering::AcqRel);
    sched.profiling.on_thread_start(worker_id);
    if sched.debug {
        eprintln!("[weft-worker-{}] started", worker_id);
    }

    let mut spin_count = 0u32;
    let mut pipe_hint = worker_id + 1;
    while sched.running.load(Ordering::Acquire) != 0 {
        if sched.try_running_task(worker_id, &mut pipe_hint) {
            spin_count = 0;
        } else {
            spin_count += 1;
            if spin_count > sched.spin_count_max {
                sched.wait_for_work(worker_id);
                spin_count = 0;
            } else {
                for _ in 0..spin_count * sched.spin_backoff_mul {
                    std::hint::spin_loop();
                }
            }
        }
    }

    sched.thread_running.fetch_sub(1, Ordering::AcqRel);
    sched.profiling.on_thread_stop(worker_id);
    if sched.debug {
        eprintln!("[weft-worker-{}] exiting", worker_id);
    }
}

/// Owner of one scheduler instance: lifecycle plus delegation to the
/// shared core. Multiple runtimes can coexist; worker identity travels
/// through each thread's entry payload, never through globals.
pub struct Runtime {
    config: SchedulerConfig,
    profiling: Profiling,
    threads_num: u32,
    layout: SchedLayout,
    sched: Option<Arc<Scheduler>>,
    pool: Option<WorkerPool>,
}

impl Runtime {
    /// Validate the configuration, resolve the thread count and compute
    /// the arena requirement. No threads start until [`start`](Runtime::start).
    pub fn new(config: SchedulerConfig, profiling: Profiling) -> SchedResult<Runtime> {
        config.validate()?;
        let threads_num = config.resolved_threads() as u32;
        let layout = SchedLayout::compute(threads_num as usize, config.pipe_size_log2)?;
        Ok(Runtime {
            config,
            profiling,
            threads_num,
            layout,
            sched: None,
            pool: None,
        })
    }

    /// Arena bytes required by [`start`](Runtime::start)
    #[inline]
    pub fn needed_memory(&self) -> usize {
        self.layout.size()
    }

    /// Threads this runtime will run with, including the main thread
    #[inline]
    pub fn num_threads(&self) -> u32 {
        self.threads_num
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.sched.is_some()
    }

    /// The shared scheduler, once started
    #[inline]
    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.sched.as_deref()
    }

    #[inline]
    fn core(&self) -> &Scheduler {
        self.sched.as_deref().expect("runtime not started")
    }

    /// Initialize the arena and spawn `threads - 1` workers (the calling
    /// thread counts as worker 0). The arena must provide at least
    /// [`needed_memory`](Runtime::needed_memory) bytes; it is re-zeroed,
    /// so a block handed back by [`stop`](Runtime::stop) can be reused.
    pub fn start(&mut self, mut arena: Arena) -> SchedResult<()> {
        if self.sched.is_some() {
            return Err(SchedError::AlreadyStarted);
        }
        if arena.len() < self.layout.size() {
            return Err(ConfigError::ArenaTooSmall {
                needed: self.layout.size(),
                got: arena.len(),
            }
            .into());
        }
        if arena.base() as usize % self.layout.align() != 0 {
            return Err(ConfigError::ArenaMisaligned.into());
        }

        arena.zero();
        let sched = Scheduler::create(
            &self.config,
            self.threads_num,
            &self.layout,
            self.profiling,
            arena,
        );

        let mut pool = WorkerPool::new(self.threads_num as usize);
        for i in 1..self.threads_num {
            let worker_sched = Arc::clone(&sched);
            if let Err(e) = pool.spawn(i, move || worker_main(i, worker_sched)) {
                // Shut down whatever did start; the arena is lost with it
                let _ = shutdown(sched, pool, false);
                return Err(e.into());
            }
        }

        self.sched = Some(sched);
        self.pool = Some(pool);
        Ok(())
    }

    /// Submit a task set; see [`Scheduler::add`].
    ///
    /// # Safety
    ///
    /// Same contract as [`Scheduler::add`].
    ///
    /// # Panics
    ///
    /// Panics when the runtime is not started.
    pub unsafe fn add(
        &self,
        task: &mut Task,
        exec: TaskFn,
        userdata: *mut c_void,
        size: u32,
        min_range: u32,
    ) {
        self.core().add(task, exec, userdata, size, min_range);
    }

    /// See [`Scheduler::join`]
    pub fn join(&self, task: &Task) {
        self.core().join(task);
    }

    /// See [`Scheduler::try_run_task`]
    pub fn try_run_task(&self) -> bool {
        self.core().try_run_task()
    }

    /// See [`Scheduler::wait`]
    pub fn wait(&self) {
        self.core().wait();
    }

    /// See [`Scheduler::run`]
    pub fn run<F>(&self, size: u32, min_range: u32, f: F)
    where
        F: Fn(Partition, u32) + Sync,
    {
        self.core().run(size, min_range, f);
    }

    /// See [`Scheduler::run_with`]
    pub fn run_with<F>(&self, size: u32, min_range: u32, f: F)
    where
        F: Fn(&Scheduler, Partition, u32) + Sync,
    {
        self.core().run_with(size, min_range, f);
    }

    /// Stop the scheduler and hand the arena back for reuse.
    ///
    /// With `do_wait` the queues are drained first (the calling thread
    /// helps); without it, still-queued work is abandoned. Either way the
    /// stop latch drops, every worker is woken until it has observed the
    /// latch and exited, and the threads are joined — workers are never
    /// cancelled mid-task.
    pub fn stop(&mut self, do_wait: bool) -> SchedResult<Arena> {
        let sched = self.sched.take().ok_or(SchedError::NotStarted)?;
        let pool = self.pool.take().ok_or(SchedError::NotStarted)?;
        shutdown(sched, pool, do_wait)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.is_started() {
            let _ = self.stop(true);
        }
    }
}

/// Drop the stop latch, optionally drain, broadcast the semaphore until
/// every worker has exited its loop, join the threads and recover the
/// arena.
fn shutdown(sched: Arc<Scheduler>, pool: WorkerPool, drain: bool) -> SchedResult<Arena> {
    sched.running.store(0, Ordering::Release);
    if drain {
        sched.wait();
    }
    while sched.thread_running.load(Ordering::Acquire) > 1 {
        // Keep firing so every parked worker picks up the latch, through
        // any lost wakeups
        let live = sched.thread_running.load(Ordering::Acquire);
        sched.semaphore().signal(live.max(0) as u32);
        std::hint::spin_loop();
    }
    pool.join();

    match Arc::try_unwrap(sched) {
        Ok(core) => Ok(core.into_arena()),
        Err(_) => Err(PlatformError::Teardown.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn started(config: SchedulerConfig) -> Runtime {
        let mut rt = Runtime::new(config, Profiling::default()).unwrap();
        let arena = Arena::new(rt.needed_memory());
        rt.start(arena).unwrap();
        rt
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut rt = Runtime::new(SchedulerConfig::new().threads(1), Profiling::default()).unwrap();
        assert!(matches!(rt.stop(true), Err(SchedError::NotStarted)));

        let arena = Arena::new(rt.needed_memory());
        rt.start(arena).unwrap();
        let arena2 = Arena::new(rt.needed_memory());
        assert!(matches!(rt.start(arena2), Err(SchedError::AlreadyStarted)));

        rt.stop(true).unwrap();
        assert!(!rt.is_started());
    }

    #[test]
    fn test_arena_too_small_rejected() {
        let mut rt = Runtime::new(SchedulerConfig::new().threads(2), Profiling::default()).unwrap();
        let needed = rt.needed_memory();
        let arena = Arena::new(needed / 2);
        match rt.start(arena) {
            Err(SchedError::Config(ConfigError::ArenaTooSmall { needed: n, .. })) => {
                assert_eq!(n, needed)
            }
            other => panic!("expected ArenaTooSmall, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_config_rejected_at_init() {
        assert!(matches!(
            Runtime::new(SchedulerConfig::new().threads(0), Profiling::default()),
            Err(SchedError::Config(ConfigError::ZeroThreads))
        ));
        assert!(matches!(
            Runtime::new(SchedulerConfig::new().pipe_size_log2(32), Profiling::default()),
            Err(SchedError::Config(ConfigError::PipeSizeTooLarge))
        ));
    }

    #[test]
    fn test_single_thread_runs_on_caller() {
        let mut rt = started(SchedulerConfig::new().threads(1));
        assert_eq!(rt.num_threads(), 1);

        let hits = AtomicU32::new(0);
        rt.run(100, 10, |partition, worker_id| {
            assert_eq!(worker_id, 0);
            hits.fetch_add(partition.len(), Ordering::Relaxed);
        });
        assert_eq!(hits.load(Ordering::Relaxed), 100);

        rt.stop(true).unwrap();
    }

    #[test]
    fn test_try_run_task_empty() {
        let mut rt = started(SchedulerConfig::new().threads(1));
        assert!(!rt.try_run_task());
        rt.stop(true).unwrap();
    }

    #[test]
    fn test_raw_add_join() {
        fn count_indices(userdata: *mut c_void, _s: &Scheduler, p: Partition, _w: u32) {
            let hits = unsafe { &*(userdata as *const AtomicU32) };
            hits.fetch_add(p.len(), Ordering::Relaxed);
        }

        let mut rt = started(SchedulerConfig::new().threads(2));
        let hits = AtomicU32::new(0);
        let mut task = Task::new();
        unsafe {
            rt.add(
                &mut task,
                count_indices,
                &hits as *const AtomicU32 as *mut c_void,
                1000,
                1,
            );
        }
        rt.join(&task);
        assert!(task.done());
        assert_eq!(hits.load(Ordering::Relaxed), 1000);

        // Idempotent completion
        rt.join(&task);
        assert!(task.done());

        rt.stop(true).unwrap();
    }

    #[test]
    fn test_size_zero_normalized_to_one() {
        let mut rt = started(SchedulerConfig::new().threads(1));
        let hits = AtomicU32::new(0);
        rt.run(0, 0, |partition, _| {
            assert_eq!(partition, Partition::new(0, 1));
            hits.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(hits.load(Ordering::Relaxed), 1);
        rt.stop(true).unwrap();
    }

    #[test]
    fn test_stop_reports_thread_descent() {
        let mut rt = started(SchedulerConfig::new().threads(4));
        assert!(rt.scheduler().unwrap().num_running() >= 1);
        let arena = rt.stop(true).unwrap();
        assert!(arena.len() > 0);
        assert!(!rt.is_started());
    }
}
