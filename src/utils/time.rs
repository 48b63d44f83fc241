use crate::error::{validation_error, SchedulerResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-time layouts accepted for range bounds and scope dates
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse an instant as sent by scheduler clients.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, the same with a `T`
/// separator, and a bare `YYYY-MM-DD` (midnight). No time-zone conversion is
/// applied: an offset, when present, is only checked for validity.
pub fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Fail with a validation error unless `value` parses as an instant
pub fn require_instant(name: &str, value: &str) -> SchedulerResult<()> {
    match parse_instant(value) {
        Some(_) => Ok(()),
        None => Err(validation_error(&format!(
            "{} '{}' is not a valid date",
            name, value
        ))),
    }
}

/// The trimmed value, or `None` when it is missing or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
