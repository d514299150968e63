//! Time pattern grammar used for duration-typed options.
//!
//! A pattern is either a bare number of milliseconds (`500`) or one or more
//! `<number><unit>` groups written from the largest unit to the smallest
//! (`1h30m`, `5m15s`, `2hours`). Each unit may appear once.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    Seconds,
    Minutes,
    Hours,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Unit::Seconds),
            "m" | "min" | "minute" | "minutes" => Some(Unit::Minutes),
            "h" | "hour" | "hours" => Some(Unit::Hours),
            _ => None,
        }
    }

    fn millis(self) -> u64 {
        match self {
            Unit::Seconds => 1_000,
            Unit::Minutes => 60_000,
            Unit::Hours => 3_600_000,
        }
    }
}

/// Parse a time pattern into a duration.
///
/// Returns `None` for anything outside the grammar, including overflow.
pub fn parse_time_pattern(text: &str) -> Option<Duration> {
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok().map(Duration::from_millis);
    }

    let mut rest = text;
    let mut total: u64 = 0;
    let mut previous: Option<Unit> = None;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let amount: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let letters = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        let unit = Unit::parse(&rest[..letters])?;
        rest = &rest[letters..];

        // strictly descending: rejects `15s5m` and `5m5m`
        if previous.map(|p| unit >= p).unwrap_or(false) {
            return None;
        }
        previous = Some(unit);

        total = total.checked_add(amount.checked_mul(unit.millis())?)?;
    }

    Some(Duration::from_millis(total))
}

/// Check whether text is a valid time pattern.
pub fn validate_time_pattern(text: &str) -> bool {
    parse_time_pattern(text).is_some()
}
