//! Number and duration formatting used by the reports.

/// Thousands separator used in text reports.
pub const THOUSANDS_SEPARATOR: char = '\'';

/// Formats `value` with `separator` between each group of three digits.
///
/// # Example
///
/// ```
/// use scoped_time::format_with_separator;
///
/// assert_eq!(format_with_separator(12_345_678, '\''), "12'345'678");
/// assert_eq!(format_with_separator(999, ','), "999");
/// ```
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division,
    reason = "indexes are bounded by the 20 digits of a u64"
)]
pub fn format_with_separator(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            result.push(separator);
        }

        result.push(digit);
    }

    result
}

/// Formats a duration in seconds as a whole number of nanoseconds with thousands separators.
///
/// Longer strings are always larger values, which makes columns easy to compare at a glance.
/// Negative and non-finite inputs format as zero.
#[must_use]
pub fn time_to_str_ns(secs: f64) -> String {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "saturating float to integer conversion is intended, fractions are dropped"
    )]
    let nanos = (secs * 1e9) as u64;

    format_with_separator(nanos, THOUSANDS_SEPARATOR)
}

/// Formats a duration in seconds in the most readable unit, as an 8 character wide number
/// with three decimals followed by a 4 character unit.
///
/// # Example
///
/// ```
/// use scoped_time::time_to_str;
///
/// assert_eq!(time_to_str(12.5), "  12.500 sec");
/// assert_eq!(time_to_str(0.25), " 250.000 ms.");
/// assert_eq!(time_to_str(0.000_5), " 500.000 us ");
/// assert_eq!(time_to_str(0.000_000_5), " 500.000 ns ");
/// ```
#[must_use]
pub fn time_to_str(secs: f64) -> String {
    if secs >= 10.0 {
        format!("{secs:8.3} sec")
    } else if secs >= 1e-2 {
        format!("{:8.3} ms.", secs * 1e3)
    } else if secs >= 1e-5 {
        format!("{:8.3} us ", secs * 1e6)
    } else {
        format!("{:8.3} ns ", secs * 1e9)
    }
}
