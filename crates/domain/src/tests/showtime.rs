// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, format_timestamp, local_start_time, parse_timestamp, show_end_time, shows_overlap,
};
use time::OffsetDateTime;

fn ts(value: &str) -> OffsetDateTime {
    parse_timestamp(value).unwrap()
}

#[test]
fn test_parse_timestamp_normalizes_to_utc() {
    let parsed: OffsetDateTime = ts("2026-03-01T21:00:00+02:00");
    assert_eq!(format_timestamp(parsed).unwrap(), "2026-03-01T19:00:00Z");
}

#[test]
fn test_format_timestamp_drops_subseconds() {
    let parsed: OffsetDateTime = ts("2026-03-01T19:00:00.750Z");
    assert_eq!(format_timestamp(parsed).unwrap(), "2026-03-01T19:00:00Z");
}

#[test]
fn test_parse_timestamp_rejects_garbage() {
    assert!(matches!(
        parse_timestamp("tomorrow at 7"),
        Err(DomainError::InvalidTimestamp { .. })
    ));
}

#[test]
fn test_show_end_time_includes_turnover() {
    let end: OffsetDateTime = show_end_time(ts("2026-03-01T19:00:00Z"), 120).unwrap();
    assert_eq!(format_timestamp(end).unwrap(), "2026-03-01T21:15:00Z");
}

#[test]
fn test_parse_timestamp_rejects_offsets_past_the_calendar_end() {
    assert!(matches!(
        parse_timestamp("9999-12-31T23:00:00-05:00"),
        Err(DomainError::InvalidTimestamp { .. })
    ));
    assert!(parse_timestamp("9999-12-31T23:00:00Z").is_ok());
}

#[test]
fn test_show_end_time_rejects_overflow() {
    assert!(matches!(
        show_end_time(ts("9999-12-31T23:00:00Z"), 120),
        Err(DomainError::InvalidTimestamp { .. })
    ));
}

#[test]
fn test_shows_overlap_is_half_open() {
    let a_start: OffsetDateTime = ts("2026-03-01T18:00:00Z");
    let a_end: OffsetDateTime = ts("2026-03-01T20:00:00Z");

    assert!(shows_overlap(
        a_start,
        a_end,
        ts("2026-03-01T19:59:00Z"),
        ts("2026-03-01T22:00:00Z")
    ));
    assert!(shows_overlap(
        a_start,
        a_end,
        ts("2026-03-01T17:00:00Z"),
        ts("2026-03-01T23:00:00Z")
    ));
    assert!(!shows_overlap(
        a_start,
        a_end,
        a_end,
        ts("2026-03-01T22:00:00Z")
    ));
    assert!(!shows_overlap(
        a_start,
        a_end,
        ts("2026-03-01T16:00:00Z"),
        a_start
    ));
}

#[test]
fn test_local_start_time_uses_theatre_timezone() {
    let start: OffsetDateTime = ts("2026-03-01T19:00:00Z");
    assert_eq!(
        local_start_time(start, "America/New_York").unwrap(),
        "2026-03-01T14:00:00-05:00"
    );
    assert_eq!(
        local_start_time(start, "UTC").unwrap(),
        "2026-03-01T19:00:00+00:00"
    );
    assert!(matches!(
        local_start_time(start, "Nowhere/Special"),
        Err(DomainError::InvalidTimezone(_))
    ));
}
