use std::time::Instant;

use crate::Clock;

/// Wall-clock backend on top of [`std::time::Instant`], with nanosecond ticks.
///
/// This is the portable default. It is slower to read than [`TscClock`][crate::TscClock]
/// but never needs calibration.
#[derive(Debug)]
#[non_exhaustive]
pub struct StdClock;

impl Clock for StdClock {
    type Tick = Instant;

    const TITLE: &'static str = "std times";

    #[inline]
    fn now() -> Instant {
        Instant::now()
    }

    #[inline]
    fn elapsed_ticks(start: Instant, end: Instant) -> i64 {
        // Saturates at ~292 years, which no measured region reaches.
        i64::try_from(end.saturating_duration_since(start).as_nanos()).unwrap_or(i64::MAX)
    }

    #[inline]
    #[expect(
        clippy::cast_precision_loss,
        reason = "sub-nanosecond loss above 2^53 ns (~104 days) is acceptable in reports"
    )]
    fn ticks_to_secs(ticks: i64) -> f64 {
        ticks as f64 / 1e9
    }
}
