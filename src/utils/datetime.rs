use chrono::{DateTime, NaiveDateTime, Timelike};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a combined date+time value as submitted by a `datetime-local`
/// input or an API client. Offset-aware values are normalized to UTC;
/// naive values are taken as UTC. Sub-second precision is dropped.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.naive_utc()),
        Err(_) => NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok()),
    };
    parsed.and_then(|dt| dt.with_nanosecond(0))
}

/// Render a timestamp in the same shape `parse_datetime` accepts, so a form
/// prefilled with it round-trips unchanged.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
