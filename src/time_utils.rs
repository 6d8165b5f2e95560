// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Layout of Garmin timestamps, e.g. `2013-05-04T16:20:01.000Z`.
const GARMIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const GARMIN_TIMESTAMP_LEN: usize = "YYYY-MM-DDTHH:MM:SS.mmmZ".len();

/// Parse a strict `YYYY-MM-DDTHH:MM:SS.mmmZ` UTC timestamp.
pub fn parse_garmin_utc(value: &str) -> Option<DateTime<Utc>> {
    let shape_ok = value.len() == GARMIN_TIMESTAMP_LEN
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            10 => b == b'T',
            13 | 16 => b == b':',
            19 => b == b'.',
            23 => b == b'Z',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }

    NaiveDateTime::parse_from_str(value, GARMIN_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Resolve the zone name Garmin sends next to a timestamp.
///
/// IANA names are matched exactly; `gmt`/`utc` are accepted in any case.
pub fn parse_zone(name: &str) -> Option<Tz> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("gmt") || name.eq_ignore_ascii_case("utc") {
        return Some(Tz::UTC);
    }
    name.parse().ok()
}

/// Format a timestamp as RFC3339 with millisecond precision.
pub fn format_rfc3339<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}
