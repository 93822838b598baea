//! The clock backends shipped with the crate.

mod null;
mod perf_counter;
mod std_clock;
mod tsc;

pub use null::NullClock;
pub use perf_counter::PerfCounterClock;
pub use std_clock::StdClock;
pub use tsc::TscClock;

/// The clock used by the measurement macros when no clock is named.
///
/// Selected with the `tsc-default-clock` and `perf-counter-default-clock` package features,
/// falling back to [`StdClock`].
#[cfg(feature = "tsc-default-clock")]
pub type DefaultClock = TscClock;

/// The clock used by the measurement macros when no clock is named.
///
/// Selected with the `tsc-default-clock` and `perf-counter-default-clock` package features,
/// falling back to [`StdClock`].
#[cfg(all(
    feature = "perf-counter-default-clock",
    not(feature = "tsc-default-clock")
))]
pub type DefaultClock = PerfCounterClock;

/// The clock used by the measurement macros when no clock is named.
///
/// Selected with the `tsc-default-clock` and `perf-counter-default-clock` package features,
/// falling back to [`StdClock`].
#[cfg(not(any(feature = "tsc-default-clock", feature = "perf-counter-default-clock")))]
pub type DefaultClock = StdClock;
