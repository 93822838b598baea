use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{Clock, TscClock};

/// How long [`processor_frequency()`] sleeps while calibrating.
pub const DEFAULT_FREQUENCY_MEASURE_TIME: Duration = Duration::from_millis(250);

/// Frequency of the [`TscClock`] counter in ticks per second.
///
/// Measured once per process by sleeping for [`DEFAULT_FREQUENCY_MEASURE_TIME`] on first call,
/// then cached. The result approximates the rated processor frequency and is meant for
/// expressing overheads in clock cycles, not for converting ticks to time.
#[must_use]
pub fn processor_frequency() -> u64 {
    static FREQUENCY: OnceLock<u64> = OnceLock::new();

    *FREQUENCY.get_or_init(|| {
        let frequency = measure_processor_frequency(DEFAULT_FREQUENCY_MEASURE_TIME);
        debug!(frequency, "measured processor frequency");
        frequency
    })
}

/// Measures the frequency of the [`TscClock`] counter in ticks per second by counting ticks
/// while the current thread sleeps for `measure_time`.
///
/// Unlike [`processor_frequency()`], this measures anew on every call.
#[must_use]
pub fn measure_processor_frequency(measure_time: Duration) -> u64 {
    let wall_start = Instant::now();
    let start = TscClock::now();

    thread::sleep(measure_time);

    let end = TscClock::now();
    let wall_elapsed = wall_start.elapsed().as_secs_f64();

    // The sleep may overshoot, so divide by the actual elapsed time.
    if wall_elapsed <= 0.0 {
        return 0;
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "frequency is an estimate, saturating conversion of the ratio is intended"
    )]
    let frequency = (end.wrapping_sub(start) as f64 / wall_elapsed) as u64;

    frequency
}
