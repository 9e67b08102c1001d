//! SAST timestamp parsing
//!
//! The scan queue reports date-times as `YYYY-MM-DDTHH:MM:SS[.fraction]`
//! without an offset, in the server's local time. Values without a fractional
//! part are treated as having zero fractional seconds.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const SAST_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Append a zero fraction when the value has no decimal point
pub fn normalise_fraction(value: &str) -> String {
    if value.contains('.') {
        value.to_string()
    } else {
        format!("{}.0", value)
    }
}

/// Parse a naive SAST date-time
pub fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(&normalise_fraction(trimmed), SAST_FORMAT).ok()
}

/// Parse a SAST date-time, interpreting it in the exporter's local zone
///
/// Returns `None` for empty, malformed, or non-existent local times.
pub fn parse_sast_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let naive = parse_naive(value)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Parse an optional wire field
pub fn parse_optional(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(parse_sast_timestamp)
}
