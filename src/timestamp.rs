use chrono::{Local, NaiveDateTime};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time as an ISO-8601 string without offset, e.g. `2024-03-01T09:15:02.123456`.
pub fn now_iso() -> String {
    Local::now().naive_local().format(ISO_FORMAT).to_string()
}

/// Parses an ISO-8601 timestamp, with or without fractional seconds or offset.
pub fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
}
