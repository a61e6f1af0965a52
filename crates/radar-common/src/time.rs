//! Time handling utilities for radar volumes.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Compact timestamp layout used by archive keys and the legacy configuration.
pub const COMPACT_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Layout of the acquisition timestamp in time-units strings and output names.
pub const ACQUISITION_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

/// Parse a requested volume time.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC assumed) and the compact
/// `YYYYMMDD_HHMMSS` form.
pub fn parse_target_time(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, COMPACT_FORMAT) {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Build a CF-style time-units string, e.g. `seconds since 2015-05-20T19:00:03Z`.
pub fn time_units(start: &DateTime<Utc>) -> String {
    format!("seconds since {}", start.format(ACQUISITION_FORMAT))
}

/// Extract the acquisition timestamp (third whitespace-delimited token) from a
/// time-units string.
pub fn acquisition_label(units: &str) -> Option<&str> {
    units.split_whitespace().nth(2)
}
