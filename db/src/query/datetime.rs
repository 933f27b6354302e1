//! Lenient date parsing for free-form filter input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized date {0:?}")]
pub struct DateParseError(String);

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f %z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

/// Parse a date written in any of the common layouts.
///
/// Accepts RFC 3339, RFC 2822, ISO-like date-times with or without seconds
/// and fractions, slash and dot separated dates, US `MM/DD/YYYY`, written
/// month names, compact `YYYYMMDD`, and unix timestamps in seconds (10
/// digits) or milliseconds (13 digits). Inputs without an offset are taken as
/// UTC; bare dates mean midnight UTC.
pub fn parse_any(text: &str) -> Result<DateTime<Utc>, DateParseError> {
    let input = text.trim();
    let fail = || DateParseError(text.to_string());

    if input.is_empty() {
        return Err(fail());
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return parse_numeric(input).ok_or_else(fail);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    for format in DATE_FORMATS {
        if let Some(dt) = NaiveDate::parse_from_str(input, format).ok().and_then(midnight) {
            return Ok(dt);
        }
    }

    Err(fail())
}

fn parse_numeric(digits: &str) -> Option<DateTime<Utc>> {
    match digits.len() {
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d").ok().and_then(midnight),
        10 => DateTime::from_timestamp(digits.parse().ok()?, 0),
        13 => DateTime::from_timestamp_millis(digits.parse().ok()?),
        _ => None,
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive))
}
