use std::sync::LazyLock;

use crate::Clock;

// Calibrated once per process, on first use.
static SOURCE: LazyLock<quanta::Clock> = LazyLock::new(quanta::Clock::new);

/// Processor timestamp counter backend.
///
/// Ticks are raw counter readings, which are the cheapest timestamps available on x86-64.
/// Conversion to seconds uses the counter frequency calibrated against the operating system
/// clock when the backend is first used. On platforms without a usable counter the ticks fall
/// back to the monotonic operating system clock in nanoseconds.
///
/// The counter is not guaranteed to be synchronized across processors, so a measurement that
/// migrates between processors may come out negative.
#[derive(Debug)]
#[non_exhaustive]
pub struct TscClock;

impl Clock for TscClock {
    type Tick = u64;

    const TITLE: &'static str = "tsc times";

    #[inline]
    fn now() -> u64 {
        SOURCE.raw()
    }

    #[inline]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "a counter running backwards must show up as a negative difference"
    )]
    fn elapsed_ticks(start: u64, end: u64) -> i64 {
        end.wrapping_sub(start) as i64
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "sub-nanosecond loss on huge totals is acceptable in reports"
    )]
    fn ticks_to_secs(ticks: i64) -> f64 {
        let secs = SOURCE.delta_as_nanos(0, ticks.unsigned_abs()) as f64 / 1e9;

        if ticks < 0 { -secs } else { secs }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn sleep_converts_to_roughly_the_slept_time() {
        let start = TscClock::now();
        thread::sleep(Duration::from_millis(5));
        let end = TscClock::now();

        let secs = TscClock::ticks_to_secs(TscClock::elapsed_ticks(start, end));
        assert!(secs >= 0.004, "measured {secs} s");
        assert!(secs < 1.0, "measured {secs} s");
    }

    #[test]
    fn negative_ticks_convert_to_negative_seconds() {
        assert!(TscClock::ticks_to_secs(-1_000_000) < 0.0);
        assert_eq!(TscClock::elapsed_ticks(10, 4), -6);
    }
}
