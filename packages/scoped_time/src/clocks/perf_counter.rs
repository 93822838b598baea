use crate::Clock;

/// Operating system performance counter backend.
///
/// On Windows this reads `QueryPerformanceCounter`. On Unix it reads `clock_gettime` with the
/// raw monotonic clock where the platform offers one (Linux, Android) and the regular
/// monotonic clock elsewhere.
#[derive(Debug)]
#[non_exhaustive]
pub struct PerfCounterClock;

impl Clock for PerfCounterClock {
    type Tick = i64;

    const TITLE: &'static str = "performance counter times";

    #[inline]
    fn now() -> i64 {
        os::counter()
    }

    #[inline]
    fn elapsed_ticks(start: i64, end: i64) -> i64 {
        end.wrapping_sub(start)
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "sub-tick loss on huge totals is acceptable in reports"
    )]
    fn ticks_to_secs(ticks: i64) -> f64 {
        ticks as f64 / os::frequency() as f64
    }
}

#[cfg(unix)]
mod os {
    use std::mem;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    const CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC_RAW;

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    const CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC;

    /// Counter value in nanoseconds.
    #[inline]
    #[allow(
        clippy::useless_conversion,
        reason = "timespec field widths differ between targets"
    )]
    pub(super) fn counter() -> i64 {
        // SAFETY: All-zero is a valid initial value for this type.
        let mut ts: libc::timespec = unsafe { mem::zeroed() };

        // SAFETY: We are passing valid arguments, no other safety requirements.
        let result = unsafe { libc::clock_gettime(CLOCK_ID, &raw mut ts) };
        debug_assert_eq!(result, 0, "monotonic clock must always be readable");

        i64::from(ts.tv_sec)
            .wrapping_mul(1_000_000_000)
            .wrapping_add(i64::from(ts.tv_nsec))
    }

    #[inline]
    pub(super) fn frequency() -> i64 {
        1_000_000_000
    }
}

#[cfg(windows)]
mod os {
    use std::sync::LazyLock;

    use windows::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};

    // Fixed at boot, so reading it once is enough.
    static FREQUENCY: LazyLock<i64> = LazyLock::new(|| {
        let mut frequency = 0_i64;

        // SAFETY: We are passing a valid out-pointer, no other safety requirements.
        let result = unsafe { QueryPerformanceFrequency(&raw mut frequency) };
        debug_assert!(result.is_ok(), "performance counter is always present since XP");

        frequency.max(1)
    });

    #[inline]
    pub(super) fn counter() -> i64 {
        let mut counter = 0_i64;

        // SAFETY: We are passing a valid out-pointer, no other safety requirements.
        let result = unsafe { QueryPerformanceCounter(&raw mut counter) };
        debug_assert!(result.is_ok(), "performance counter is always present since XP");

        counter
    }

    #[inline]
    pub(super) fn frequency() -> i64 {
        *FREQUENCY
    }
}

#[cfg(not(any(unix, windows)))]
mod os {
    use std::sync::LazyLock;
    use std::time::Instant;

    static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

    #[inline]
    pub(super) fn counter() -> i64 {
        i64::try_from(EPOCH.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    #[inline]
    pub(super) fn frequency() -> i64 {
        1_000_000_000
    }
}
