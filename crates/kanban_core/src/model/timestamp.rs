//! Local wall-clock timestamp conventions.
//!
//! # Responsibility
//! - Format timestamps for storage as `YYYY-MM-DD HH:MM:SS`.
//! - Parse stored values, tolerating a fractional-second suffix.
//!
//! # Invariants
//! - All timestamps are naive local wall-clock values with second precision.
//!   Time zones are never attached, so due dates written by an edit compare
//!   consistently with the scheduler's notion of "now".

use chrono::{NaiveDateTime, Timelike};

/// Storage format for every timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_READ_FORMATS: &[&str] = &[TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S"];
const ACCEPTED_INPUT_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Drops any sub-second component.
pub fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

/// Formats a timestamp in storage form.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    truncate_to_seconds(value).format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Anything after the first `.` is discarded before parsing, so
/// `2025-03-01 09:30:00.123456` reads as `2025-03-01 09:30:00`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let whole_seconds = trimmed.split('.').next().unwrap_or(trimmed);
    parse_with(whole_seconds, ACCEPTED_READ_FORMATS)
}

/// Parses a user-supplied due date; minutes precision is accepted.
pub fn parse_user_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_with(raw.trim(), ACCEPTED_INPUT_FORMATS)
}

fn parse_with(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
