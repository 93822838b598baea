use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{Clock, Policy, Record, TrackDepth};

/// Measures one invocation of a region, from creation until drop.
///
/// Returned by [`Record::scope()`] for the [`Base`][crate::Base] and
/// [`ThreadSafe`][crate::ThreadSafe] policies. The elapsed time is committed when the scope is
/// dropped, including during unwinding.
///
/// When the `enabled` package feature is off, the scope is zero-sized and does nothing.
///
/// The type is single-threaded: it must be dropped on the thread that created it.
#[must_use = "measurement stops when the scope is dropped, so bind it to a named variable"]
pub struct Scope<'a, C: Clock, P: Policy> {
    #[cfg(feature = "enabled")]
    record: &'a Record<C, P>,

    #[cfg(feature = "enabled")]
    start: C::Tick,

    _record: PhantomData<&'a Record<C, P>>,
    _single_threaded: PhantomData<*const ()>,
}

impl<'a, C: Clock, P: Policy> Scope<'a, C, P> {
    #[inline]
    pub(crate) fn new(record: &'a Record<C, P>) -> Self {
        #[cfg(not(feature = "enabled"))]
        let _ = record;

        Self {
            #[cfg(feature = "enabled")]
            record,
            #[cfg(feature = "enabled")]
            start: C::now(),
            _record: PhantomData,
            _single_threaded: PhantomData,
        }
    }
}

#[cfg(feature = "enabled")]
impl<C: Clock, P: Policy> Drop for Scope<'_, C, P> {
    #[inline]
    fn drop(&mut self) {
        self.record.stop_measure(self.start);
    }
}

impl<C: Clock, P: Policy> fmt::Debug for Scope<'_, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "enabled")]
        {
            f.debug_struct(type_name::<Self>())
                .field("record", &self.record.name())
                .field("start", &self.start)
                .finish()
        }

        #[cfg(not(feature = "enabled"))]
        {
            f.debug_struct(type_name::<Self>()).finish_non_exhaustive()
        }
    }
}

/// Measures one invocation of a region that may be entered recursively.
///
/// Returned by [`Record::scope()`] for the [`RecursionSafe`][crate::RecursionSafe] and
/// [`ThreadRecursionSafe`][crate::ThreadRecursionSafe] policies. Only the outermost scope
/// reads the clock and commits. Nested scopes merely adjust the depth of the record.
///
/// When the `enabled` package feature is off, the scope is zero-sized and does nothing.
///
/// The type is single-threaded: it must be dropped on the thread that created it.
#[must_use = "measurement stops when the scope is dropped, so bind it to a named variable"]
pub struct RecursiveScope<'a, C: Clock, P: TrackDepth> {
    #[cfg(feature = "enabled")]
    record: &'a Record<C, P>,

    // Only the outermost scope holds a start tick.
    #[cfg(feature = "enabled")]
    start: Option<C::Tick>,

    _record: PhantomData<&'a Record<C, P>>,
    _single_threaded: PhantomData<*const ()>,
}

impl<'a, C: Clock, P: TrackDepth> RecursiveScope<'a, C, P> {
    #[inline]
    pub(crate) fn new(record: &'a Record<C, P>) -> Self {
        #[cfg(not(feature = "enabled"))]
        let _ = record;

        Self {
            #[cfg(feature = "enabled")]
            record,
            #[cfg(feature = "enabled")]
            start: record.increment_depth().then(C::now),
            _record: PhantomData,
            _single_threaded: PhantomData,
        }
    }
}

#[cfg(feature = "enabled")]
impl<C: Clock, P: TrackDepth> Drop for RecursiveScope<'_, C, P> {
    #[inline]
    fn drop(&mut self) {
        let outermost = self.record.decrement_depth();

        if let (true, Some(start)) = (outermost, self.start) {
            self.record.stop_measure(start);
        }
    }
}

impl<C: Clock, P: TrackDepth> fmt::Debug for RecursiveScope<'_, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "enabled")]
        {
            f.debug_struct(type_name::<Self>())
                .field("record", &self.record.name())
                .field("start", &self.start)
                .finish()
        }

        #[cfg(not(feature = "enabled"))]
        {
            f.debug_struct(type_name::<Self>()).finish_non_exhaustive()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{Base, RecursionSafe, StdClock, ThreadRecursionSafe, ThreadSafe};

    assert_not_impl_any!(Scope<'static, StdClock, Base>: Send, Sync);
    assert_not_impl_any!(RecursiveScope<'static, StdClock, RecursionSafe>: Send, Sync);
    assert_impl_all!(Scope<'static, StdClock, ThreadSafe>: fmt::Debug);

    #[cfg(feature = "enabled")]
    mod enabled {
        use std::panic::{self, AssertUnwindSafe};

        use super::*;
        use crate::clock::ManualClock;

        fn recurse<P: TrackDepth>(record: &Record<ManualClock, P>, depth: u32) {
            let _scope = record.scope();
            ManualClock::advance(10);

            if depth > 1 {
                recurse(record, depth - 1);
            }
        }

        fn recurse_unsafe(record: &Record<ManualClock, Base>, depth: u32) {
            let _scope = record.scope();
            ManualClock::advance(10);

            if depth > 1 {
                recurse_unsafe(record, depth - 1);
            }
        }

        #[test]
        fn scope_commits_on_drop() {
            let record = Record::<ManualClock, Base>::new("test");

            {
                let _scope = record.scope();
                ManualClock::advance(123);
                assert_eq!(record.num_calls(), 0);
            }

            assert_eq!(record.num_calls(), 1);
            assert_eq!(record.total_ticks(), 123);
        }

        #[test]
        fn scope_commits_during_unwinding() {
            let record = Record::<ManualClock, ThreadSafe>::new("test");

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let _scope = record.scope();
                ManualClock::advance(7);
                panic!("leaving the region by unwinding");
            }));

            assert!(result.is_err());
            assert_eq!(record.num_calls(), 1);
            assert_eq!(record.total_ticks(), 7);
        }

        #[test]
        fn base_recursion_counts_every_level() {
            let record = Record::<ManualClock, Base>::new("test");

            recurse_unsafe(&record, 10);

            // Every level counts its own time plus that of the levels below it.
            assert_eq!(record.num_calls(), 10);
            assert_eq!(record.total_ticks(), (1..=10).map(|n| n * 10).sum::<i64>());
        }

        #[test]
        fn recursion_safe_measures_outermost_only() {
            let record = Record::<ManualClock, RecursionSafe>::new("test");

            recurse(&record, 10);

            assert_eq!(record.num_calls(), 1);
            assert_eq!(record.total_ticks(), 100);
            assert_eq!(record.depth(), 0);
        }

        #[test]
        fn thread_recursion_safe_measures_outermost_only() {
            let record = Record::<ManualClock, ThreadRecursionSafe>::new("test");

            recurse(&record, 10);

            assert_eq!(record.num_calls(), 1);
            assert_eq!(record.total_ticks(), 100);
            assert_eq!(record.depth(), 0);
        }

        #[test]
        fn recursive_scope_restores_depth_during_unwinding() {
            let record = Record::<ManualClock, RecursionSafe>::new("test");

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let _outer = record.scope();
                let _inner = record.scope();
                ManualClock::advance(3);
                panic!("leaving both levels by unwinding");
            }));

            assert!(result.is_err());
            assert_eq!(record.depth(), 0);
            assert_eq!(record.num_calls(), 1);
            assert_eq!(record.total_ticks(), 3);
        }

        #[test]
        fn nested_scope_does_not_commit_early() {
            let record = Record::<ManualClock, ThreadRecursionSafe>::new("test");

            let outer = record.scope();
            {
                let _inner = record.scope();
                ManualClock::advance(5);
            }
            assert_eq!(record.num_calls(), 0);

            ManualClock::advance(5);
            drop(outer);

            assert_eq!(record.num_calls(), 1);
            assert_eq!(record.total_ticks(), 10);
        }

        #[test]
        fn debug_shows_record_name() {
            let record = Record::<ManualClock, RecursionSafe>::new("named");
            let scope = record.scope();

            assert!(format!("{scope:?}").contains("named"));
        }
    }

    #[cfg(not(feature = "enabled"))]
    #[test]
    fn disabled_scope_records_nothing() {
        let record = Record::<StdClock, ThreadRecursionSafe>::new("test");

        {
            let _scope = record.scope();
        }

        assert_eq!(record.num_calls(), 0);
        assert_eq!(size_of::<Scope<'static, StdClock, Base>>(), 0);
    }
}
