//! Date and date-time formats spoken by the REST API.
//!
//! Requests are sent as `2016-10-08T04:09:25.000Z`. Responses come back with a numeric offset
//! and no colon (`2016-10-08T04:09:25.000+0000`), which is not RFC 3339, so parsing accepts both.

use chrono::{DateTime, NaiveDate, Utc};

/// Format of `person.birthdate` in requests.
pub const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

/// Formats `dt` the way the REST documentation examples do (millisecond precision, `Z`).
pub fn format_rest_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses a REST date-time in either the RFC 3339 or the `+0000` offset form.
pub fn parse_rest_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    DateTime::parse_from_rfc3339(input)
        .or_else(|_| DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a `YYYY-MM-DD` birthdate.
pub fn parse_birthdate(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, BIRTHDATE_FORMAT).ok()
}
