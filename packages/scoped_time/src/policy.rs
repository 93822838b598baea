//! Safety policies that trade measurement overhead for thread and recursion safety.
//!
//! | Policy                  | Concurrent use | Recursive use | Relative cost |
//! |-------------------------|----------------|---------------|---------------|
//! | [`Base`]                | no             | no            | lowest        |
//! | [`ThreadSafe`]          | yes            | no            | low           |
//! | [`RecursionSafe`]       | no             | yes           | lowest        |
//! | [`ThreadRecursionSafe`] | yes            | yes           | highest       |
//!
//! Using a record in a way its policy does not support is not detected. It silently inflates
//! the measured time (recursion) or loses updates (concurrency). It never causes undefined
//! behavior.

use std::fmt::Debug;
use std::sync::atomic::{self, AtomicU32};
use std::thread::{self, ThreadId};

use foldhash::HashMap;
use parking_lot::Mutex;

use crate::{Clock, RecursiveScope, Record, Scope, Sealed};

/// Depth counters of single-threaded recursion-safe records are read and written with plain
/// loads and stores. Concurrent use is unsupported for that policy, so we only need the
/// atomics to keep the record `Sync` without paying for read-modify-write instructions.
const DEPTH_ORDERING: atomic::Ordering = atomic::Ordering::Relaxed;

/// Selects how a [`Record`] synchronizes its updates and which scope type measures it.
///
/// This trait is sealed. The four implementations are [`Base`], [`ThreadSafe`],
/// [`RecursionSafe`] and [`ThreadRecursionSafe`].
pub trait Policy: Sealed + Debug + Send + Sync + Sized + 'static {
    /// Per-record state the policy needs (locks, depth counters).
    type State: Debug + Default + Send + Sync;

    /// The guard returned by [`Record::scope()`].
    type Scope<'a, C: Clock>: Debug
    where
        Self: 'a,
        C: 'a;

    /// Name of the policy, for diagnostics.
    const NAME: &'static str;

    /// Starts measuring one invocation of the region that `record` tracks.
    fn enter<C: Clock>(record: &Record<C, Self>) -> Self::Scope<'_, C>;

    /// Commits the time elapsed since `start` as one completed call.
    fn stop_measure<C: Clock>(record: &Record<C, Self>, start: C::Tick);

    /// Sets the counters of `record` back to zero, serialized with commits if the policy
    /// serializes those.
    fn reset<C: Clock>(record: &Record<C, Self>);
}

/// A policy that counts nested invocations of the same record.
///
/// Only the outermost invocation is measured: the start tick is taken when the depth goes from
/// 0 to 1 and the elapsed time is committed when it returns from 1 to 0.
pub trait TrackDepth: Policy {
    /// Increments the depth, returning `true` if this was the outermost entry.
    fn increment_depth(state: &Self::State) -> bool;

    /// Decrements the depth, returning `true` if this was the outermost exit.
    fn decrement_depth(state: &Self::State) -> bool;

    /// The current depth.
    fn depth(state: &Self::State) -> u32;
}

/// No synchronization and no recursion tracking. The fastest policy.
///
/// Concurrent calls may lose updates and recursive calls are counted once per nesting level.
#[derive(Debug)]
#[non_exhaustive]
pub struct Base;

/// Serializes commits with a lock, so concurrent calls never lose updates.
///
/// Recursive calls are still counted once per nesting level.
#[derive(Debug)]
#[non_exhaustive]
pub struct ThreadSafe;

/// Measures only the outermost of nested invocations on one thread.
///
/// The depth counter is shared by all threads, so concurrent use gives wrong results.
#[derive(Debug)]
#[non_exhaustive]
pub struct RecursionSafe;

/// Measures only the outermost of nested invocations, with a separate depth per thread,
/// and serializes commits and depth changes with a lock.
#[derive(Debug)]
#[non_exhaustive]
pub struct ThreadRecursionSafe;

impl Sealed for Base {}
impl Sealed for ThreadSafe {}
impl Sealed for RecursionSafe {}
impl Sealed for ThreadRecursionSafe {}

impl Policy for Base {
    type State = ();
    type Scope<'a, C: Clock>
        = Scope<'a, C, Self>
    where
        Self: 'a,
        C: 'a;

    const NAME: &'static str = "Base";

    #[inline]
    fn enter<C: Clock>(record: &Record<C, Self>) -> Self::Scope<'_, C> {
        Scope::new(record)
    }

    #[inline]
    fn stop_measure<C: Clock>(record: &Record<C, Self>, start: C::Tick) {
        record.commit(C::elapsed_ticks(start, C::now()));
    }

    fn reset<C: Clock>(record: &Record<C, Self>) {
        record.clear();
    }
}

impl Policy for ThreadSafe {
    type State = Mutex<()>;
    type Scope<'a, C: Clock>
        = Scope<'a, C, Self>
    where
        Self: 'a,
        C: 'a;

    const NAME: &'static str = "ThreadSafe";

    #[inline]
    fn enter<C: Clock>(record: &Record<C, Self>) -> Self::Scope<'_, C> {
        Scope::new(record)
    }

    #[inline]
    fn stop_measure<C: Clock>(record: &Record<C, Self>, start: C::Tick) {
        // The end tick is read before locking so that lock contention is not measured.
        let elapsed = C::elapsed_ticks(start, C::now());

        let _guard = record.state().lock();
        record.commit(elapsed);
    }

    fn reset<C: Clock>(record: &Record<C, Self>) {
        let _guard = record.state().lock();
        record.clear();
    }
}

impl Policy for RecursionSafe {
    type State = AtomicU32;
    type Scope<'a, C: Clock>
        = RecursiveScope<'a, C, Self>
    where
        Self: 'a,
        C: 'a;

    const NAME: &'static str = "RecursionSafe";

    #[inline]
    fn enter<C: Clock>(record: &Record<C, Self>) -> Self::Scope<'_, C> {
        RecursiveScope::new(record)
    }

    #[inline]
    fn stop_measure<C: Clock>(record: &Record<C, Self>, start: C::Tick) {
        record.commit(C::elapsed_ticks(start, C::now()));
    }

    fn reset<C: Clock>(record: &Record<C, Self>) {
        record.clear();
    }
}

impl TrackDepth for RecursionSafe {
    #[inline]
    fn increment_depth(state: &AtomicU32) -> bool {
        let depth = state.load(DEPTH_ORDERING).wrapping_add(1);
        state.store(depth, DEPTH_ORDERING);
        depth == 1
    }

    #[inline]
    fn decrement_depth(state: &AtomicU32) -> bool {
        let Some(depth) = state.load(DEPTH_ORDERING).checked_sub(1) else {
            // Not inside the record, so there is nothing to commit.
            return false;
        };

        state.store(depth, DEPTH_ORDERING);
        depth == 0
    }

    fn depth(state: &AtomicU32) -> u32 {
        state.load(DEPTH_ORDERING)
    }
}

/// Depth of each thread that is currently inside a thread+recursion-safe record.
///
/// The map lives in the record, so the effective key is the (thread, record) pair. Threads
/// are removed when they leave the outermost scope, which keeps the map as small as the
/// number of threads concurrently inside the record.
#[derive(Debug, Default)]
pub struct ThreadDepths {
    pub(crate) depths: Mutex<HashMap<ThreadId, u32>>,
}

impl Policy for ThreadRecursionSafe {
    type State = ThreadDepths;
    type Scope<'a, C: Clock>
        = RecursiveScope<'a, C, Self>
    where
        Self: 'a,
        C: 'a;

    const NAME: &'static str = "ThreadRecursionSafe";

    #[inline]
    fn enter<C: Clock>(record: &Record<C, Self>) -> Self::Scope<'_, C> {
        RecursiveScope::new(record)
    }

    #[inline]
    fn stop_measure<C: Clock>(record: &Record<C, Self>, start: C::Tick) {
        let elapsed = C::elapsed_ticks(start, C::now());

        let _guard = record.state().depths.lock();
        record.commit(elapsed);
    }

    fn reset<C: Clock>(record: &Record<C, Self>) {
        let _guard = record.state().depths.lock();
        record.clear();
    }
}

impl TrackDepth for ThreadRecursionSafe {
    fn increment_depth(state: &ThreadDepths) -> bool {
        let mut depths = state.depths.lock();
        let depth = depths.entry(thread::current().id()).or_insert(0);
        *depth = depth.wrapping_add(1);
        *depth == 1
    }

    fn decrement_depth(state: &ThreadDepths) -> bool {
        let thread_id = thread::current().id();
        let mut depths = state.depths.lock();

        let Some(depth) = depths.get_mut(&thread_id) else {
            // Not inside the record on this thread, so there is nothing to commit.
            return false;
        };

        *depth = depth.saturating_sub(1);

        if *depth == 0 {
            depths.remove(&thread_id);
            true
        } else {
            false
        }
    }

    fn depth(state: &ThreadDepths) -> u32 {
        state
            .depths
            .lock()
            .get(&thread::current().id())
            .copied()
            .unwrap_or(0)
    }
}
