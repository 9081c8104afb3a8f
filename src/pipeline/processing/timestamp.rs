//! Free-form ISO-8601 timestamps to canonical UTC strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde_json::Value;

use crate::constants::UNKNOWN_DAY;

const OFFSET_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    // basic format
    "%Y%m%dT%H%M%S%.f%:z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y%m%dT%H%M%:z",
    "%Y%m%dT%H%M%z",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// `2024-01-01T10` and `2024-01-01T10+05:00` become `...T10:00...` so the minute formats apply.
fn expand_hour_only(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() < 13 || !matches!(bytes[10], b'T' | b' ') {
        return None;
    }
    if !bytes[11].is_ascii_digit() || !bytes[12].is_ascii_digit() {
        return None;
    }
    match bytes.get(13) {
        None | Some(b'+') | Some(b'-') => Some(format!("{}:00{}", &s[..13], &s[13..])),
        _ => None,
    }
}

fn parse_candidate(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

/// Parse a timestamp string, treating a missing offset as UTC.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let s = match trimmed.strip_suffix('Z').or_else(|| trimmed.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };
    // ISO-8601 allows a comma as the decimal sign
    let s = s.replace(',', ".");

    parse_candidate(&s).or_else(|| expand_hour_only(&s).and_then(|e| parse_candidate(&e)))
}

/// Parse any JSON value; only non-empty strings can be timestamps.
pub fn parse_value(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value {
        Some(Value::String(s)) => parse_utc(s),
        _ => None,
    }
}

/// Canonical form: `YYYY-MM-DDTHH:MM:SSZ`, with microseconds only when non-zero.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    } else {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// Normalize a raw field to a canonical UTC string, or `None` if it is not a valid timestamp.
pub fn normalize(value: Option<&Value>) -> Option<String> {
    parse_value(value).map(|dt| format_utc(&dt))
}

/// UTC calendar day of a timestamp, or the `UNKNOWN_DAY` sentinel.
pub fn day_bucket(value: Option<&Value>) -> String {
    parse_value(value)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|| UNKNOWN_DAY.to_string())
}
