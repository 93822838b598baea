//! The capability a timing backend provides to records.

use std::fmt::Debug;

/// A source of monotonic ticks that records use to measure elapsed time.
///
/// Clocks are selected at compile time as a type parameter of [`Record`][crate::Record] and
/// [`Database`][crate::Database]. All functions are associated functions (no `self`), so the
/// selection costs no indirection at the measurement site.
///
/// Implementations must not block, allocate or panic in [`now()`][Self::now],
/// [`elapsed_ticks()`][Self::elapsed_ticks] or [`ticks_to_secs()`][Self::ticks_to_secs].
///
/// # Example
///
/// ```
/// use scoped_time::{Clock, StdClock};
///
/// let start = StdClock::now();
/// let end = StdClock::now();
///
/// let ticks = StdClock::elapsed_ticks(start, end);
/// assert!(StdClock::ticks_to_secs(ticks) >= 0.0);
/// ```
pub trait Clock: 'static {
    /// An opaque, totally ordered timestamp in backend-defined units.
    type Tick: Copy + Debug + Send + Sync;

    /// Human-readable name of the backend, used in report banners.
    const TITLE: &'static str;

    /// Reads the current timestamp.
    fn now() -> Self::Tick;

    /// Difference between two timestamps in backend-native tick units.
    ///
    /// This may be negative if the backend is not monotonic across processors.
    fn elapsed_ticks(start: Self::Tick, end: Self::Tick) -> i64;

    /// Converts a tick difference into seconds.
    fn ticks_to_secs(ticks: i64) -> f64;
}

#[cfg(test)]
pub(crate) use manual::ManualClock;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod manual {
    use std::cell::Cell;

    use crate::Clock;

    thread_local! {
        static TICKS: Cell<i64> = const { Cell::new(0) };
    }

    /// Deterministic clock for tests, one nanosecond per tick.
    ///
    /// The current tick is thread-local so that tests running in parallel on the
    /// test harness threads do not observe each other's time.
    #[derive(Debug)]
    pub(crate) struct ManualClock;

    impl ManualClock {
        pub(crate) fn set(ticks: i64) {
            TICKS.with(|t| t.set(ticks));
        }

        pub(crate) fn advance(ticks: i64) {
            TICKS.with(|t| t.set(t.get().wrapping_add(ticks)));
        }
    }

    impl Clock for ManualClock {
        type Tick = i64;

        const TITLE: &'static str = "manual times";

        fn now() -> i64 {
            TICKS.with(Cell::get)
        }

        fn elapsed_ticks(start: i64, end: i64) -> i64 {
            end.wrapping_sub(start)
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "test clock, values stay far below 2^52"
        )]
        fn ticks_to_secs(ticks: i64) -> f64 {
            ticks as f64 / 1e9
        }
    }
}
