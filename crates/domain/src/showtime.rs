// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};

/// Cleaning and turnover time reserved after every show, in minutes.
pub const TURNOVER_MINUTES: i64 = 15;

/// Parses an RFC 3339 timestamp and normalizes it to UTC.
///
/// # Errors
///
/// Returns an error if the value is not valid RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    let parsed: OffsetDateTime =
        OffsetDateTime::parse(value, &Rfc3339).map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })?;
    parsed
        .checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| out_of_range(value))
}

fn out_of_range(value: &str) -> DomainError {
    DomainError::InvalidTimestamp {
        value: value.to_string(),
        error: String::from("out of range"),
    }
}

/// Formats a timestamp as RFC 3339 in UTC, truncated to whole seconds.
///
/// Stored timestamps use this form so that text comparison orders them
/// chronologically.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, DomainError> {
    let utc: OffsetDateTime = value
        .checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| out_of_range(&value.to_string()))?
        .replace_nanosecond(0)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })?;
    utc.format(&Rfc3339)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// Computes when a show releases its screen: the runtime plus turnover.
///
/// # Errors
///
/// Returns an error if the end falls outside the representable range.
pub fn show_end_time(
    start: OffsetDateTime,
    duration_minutes: i32,
) -> Result<OffsetDateTime, DomainError> {
    start
        .checked_add(Duration::minutes(
            i64::from(duration_minutes) + TURNOVER_MINUTES,
        ))
        .ok_or_else(|| out_of_range(&start.to_string()))
}

/// Returns whether two half-open intervals `[start, end)` overlap.
#[must_use]
pub fn shows_overlap(
    a_start: OffsetDateTime,
    a_end: OffsetDateTime,
    b_start: OffsetDateTime,
    b_end: OffsetDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Renders a UTC show start in the theatre's local time.
///
/// The result is RFC 3339 with the local offset, e.g.
/// `2026-03-01T19:30:00-05:00`.
///
/// # Errors
///
/// Returns an error if the timezone is unknown.
pub fn local_start_time(start_utc: OffsetDateTime, timezone: &str) -> Result<String, DomainError> {
    let tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
    let utc = chrono::DateTime::from_timestamp(start_utc.unix_timestamp(), 0).ok_or_else(|| {
        DomainError::InvalidTimestamp {
            value: start_utc.to_string(),
            error: String::from("out of range"),
        }
    })?;
    Ok(utc
        .with_timezone(&tz)
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, false))
}
