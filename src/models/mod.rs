mod body;
pub mod coerce;
mod query;
mod response;
mod task;
mod user;

pub use body::{require_string, TaskBody, UserBody};
pub use query::{ListOptions, ListQuery, SelectQuery};
pub use response::ApiResponse;
pub use task::{Task, UNASSIGNED};
pub use user::User;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Shared timestamp policy for `deadline` and `dateCreated` values.
///
/// A JSON number, or a string that parses entirely as a number (sign and
/// decimal point included), is taken as epoch milliseconds. Anything else is
/// tried as a calendar date string. Returns None when no reading works.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(millis_to_instant),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

fn millis_to_instant(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Numeric strings are epoch milliseconds, not dates
    if let Ok(millis) = trimmed.parse::<f64>() {
        return millis_to_instant(millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}
