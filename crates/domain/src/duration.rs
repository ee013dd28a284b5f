//! Human-readable duration strings (`"500ms"`, `"2s"`, `"1.5m"`, `"1h"`).

use std::time::Duration;

use crate::error::{DomainError, DomainResult};

/// Parses a duration string.
///
/// A bare number is read as milliseconds. Recognised units are `ms`,
/// `s`/`sec`/`secs`/`seconds`, `m`/`min`/`mins`/`minutes` and
/// `h`/`hr`/`hrs`/`hours`, case-insensitive, optionally separated from the
/// number by whitespace.
///
/// # Errors
///
/// Returns [`DomainError::InvalidDuration`] for empty input, a negative or
/// non-numeric amount, or an unknown unit.
pub fn parse_duration(input: &str) -> DomainResult<Duration> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split);

    let amount: f64 = amount
        .parse()
        .map_err(|_| DomainError::InvalidDuration(input.to_string()))?;

    let millis_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        _ => return Err(DomainError::InvalidDuration(input.to_string())),
    };

    Duration::try_from_secs_f64(amount * millis_per_unit / 1_000.0)
        .map_err(|_| DomainError::InvalidDuration(input.to_string()))
}
