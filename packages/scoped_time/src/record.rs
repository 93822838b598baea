//! The accumulator behind one named timer.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicI64, AtomicU64};

use crate::{Base, Clock, Database, DefaultClock, DynamicDatabase, Policy, TrackDepth};

/// Counters are updated with a separate load and store instead of an atomic
/// read-modify-write. Policies that support concurrency serialize commits with their own lock,
/// while [`Base`] and [`RecursionSafe`][crate::RecursionSafe] explicitly accept lost updates
/// under concurrent use in exchange for the cheapest possible commit.
const COUNTER_ORDERING: atomic::Ordering = atomic::Ordering::Relaxed;

/// Accumulates the call count and total elapsed time of one named code region.
///
/// A record is typically created once per region, with process lifetime, and measured many
/// times through [`scope()`][Self::scope]. The clock `C` and the safety [`Policy`] `P` are
/// chosen at compile time.
///
/// Records created via [`register()`][Self::register], [`Database::record()`] or
/// [`dynamic()`][Self::dynamic] appear in the reports of their database. Records created via
/// [`new()`][Self::new] are not registered anywhere.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, LazyLock};
///
/// use scoped_time::{Base, Record, StdClock};
///
/// static PARSE: LazyLock<Arc<Record<StdClock, Base>>> =
///     LazyLock::new(|| Record::register("parse"));
///
/// for _ in 0..3 {
///     let _scope = PARSE.scope();
///     // Code to measure.
/// }
///
/// if scoped_time::ENABLED {
///     assert_eq!(PARSE.num_calls(), 3);
/// }
/// ```
pub struct Record<C: Clock = DefaultClock, P: Policy = Base> {
    name: Cow<'static, str>,
    total_ticks: AtomicI64,
    num_calls: AtomicU64,
    state: P::State,

    _clock: PhantomData<fn() -> C>,
}

impl<C: Clock, P: Policy> Record<C, P> {
    /// Creates a record that is not registered in any database.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            total_ticks: AtomicI64::new(0),
            num_calls: AtomicU64::new(0),
            state: P::State::default(),
            _clock: PhantomData,
        }
    }

    /// Creates a record registered in the process-wide database of clock `C`.
    #[must_use]
    pub fn register(name: impl Into<Cow<'static, str>>) -> Arc<Self> {
        Database::<C>::global().record(name)
    }

    /// Returns the record with a runtime-computed name from the process-wide dynamic database
    /// of this clock and policy, creating and registering it on first use.
    ///
    /// This allocates and takes locks. Call it outside the measured region and keep the
    /// returned record to create scopes inside it.
    #[must_use]
    pub fn dynamic(name: &str) -> Arc<Self> {
        DynamicDatabase::<C, P>::global().get_or_add(name)
    }

    /// The name that identifies the record in reports and lookups.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the clock, for use as the start tick of [`stop_measure()`][Self::stop_measure].
    #[inline]
    #[must_use]
    pub fn now(&self) -> C::Tick {
        C::now()
    }

    /// Commits the time elapsed since `start` as one completed call.
    ///
    /// Prefer [`scope()`][Self::scope], which also stops the measurement when the region is
    /// left by an early return or a panic.
    #[inline]
    pub fn stop_measure(&self, start: C::Tick) {
        P::stop_measure(self, start);
    }

    /// Starts measuring one invocation. The measurement ends when the scope is dropped.
    #[inline]
    pub fn scope(&self) -> P::Scope<'_, C> {
        P::enter(self)
    }

    /// Number of completed calls.
    #[must_use]
    pub fn num_calls(&self) -> u64 {
        self.num_calls.load(COUNTER_ORDERING)
    }

    /// Total elapsed time in the clock's native ticks.
    #[must_use]
    pub fn total_ticks(&self) -> i64 {
        self.total_ticks.load(COUNTER_ORDERING)
    }

    /// Total elapsed time in seconds.
    ///
    /// This may be zero or negative for clocks that measure nothing (e.g.
    /// [`NullClock`][crate::NullClock]) or run backwards between processors. Treat a
    /// non-positive total as "no data".
    #[must_use]
    pub fn total_secs(&self) -> f64 {
        C::ticks_to_secs(self.total_ticks())
    }

    /// Sets the call count and total time back to zero.
    ///
    /// For [`ThreadSafe`][crate::ThreadSafe] and
    /// [`ThreadRecursionSafe`][crate::ThreadRecursionSafe] records this is serialized with
    /// commits, so a concurrent call lands entirely before or entirely after the reset.
    pub fn reset(&self) {
        P::reset(self);
    }

    pub(crate) fn clear(&self) {
        self.total_ticks.store(0, COUNTER_ORDERING);
        self.num_calls.store(0, COUNTER_ORDERING);
    }

    /// Adds one completed call that took `elapsed` ticks.
    #[inline]
    pub(crate) fn commit(&self, elapsed: i64) {
        let total = self.total_ticks.load(COUNTER_ORDERING).wrapping_add(elapsed);
        self.total_ticks.store(total, COUNTER_ORDERING);

        let calls = self.num_calls.load(COUNTER_ORDERING).wrapping_add(1);
        self.num_calls.store(calls, COUNTER_ORDERING);
    }

    #[inline]
    pub(crate) fn state(&self) -> &P::State {
        &self.state
    }
}

impl<C: Clock, P: TrackDepth> Record<C, P> {
    /// Enters one nesting level, returning `true` if this is the outermost one.
    ///
    /// Only capture a start tick when this returns `true`.
    #[inline]
    pub fn increment_depth(&self) -> bool {
        P::increment_depth(&self.state)
    }

    /// Leaves one nesting level, returning `true` if this was the outermost one.
    ///
    /// Only call [`stop_measure()`][Self::stop_measure] when this returns `true`.
    #[inline]
    pub fn decrement_depth(&self) -> bool {
        P::decrement_depth(&self.state)
    }

    /// The current nesting depth (of the calling thread, for
    /// [`ThreadRecursionSafe`][crate::ThreadRecursionSafe]).
    #[must_use]
    pub fn depth(&self) -> u32 {
        P::depth(&self.state)
    }
}

impl<C: Clock, P: Policy> fmt::Debug for Record<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("name", &self.name)
            .field("policy", &P::NAME)
            .field("num_calls", &self.num_calls())
            .field("total_ticks", &self.total_ticks())
            .finish_non_exhaustive()
    }
}

/// Read access to a registered record, independent of its clock and policy.
///
/// This is what a [`Database`] stores and what reports are generated from.
pub trait RecordStats: fmt::Debug + Send + Sync {
    /// The name that identifies the record.
    fn name(&self) -> &str;

    /// Number of completed calls.
    fn num_calls(&self) -> u64;

    /// Total elapsed time in seconds.
    fn total_secs(&self) -> f64;

    /// Sets the call count and total time back to zero.
    fn reset(&self);
}

impl<C: Clock, P: Policy> RecordStats for Record<C, P> {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn num_calls(&self) -> u64 {
        Self::num_calls(self)
    }

    fn total_secs(&self) -> f64 {
        Self::total_secs(self)
    }

    fn reset(&self) {
        Self::reset(self);
    }
}
