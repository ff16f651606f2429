/// Utility functions
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;

/// Timestamp layout the catalog expects inside `where` clauses
pub const CATALOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extract number from JSON value
pub fn num(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    if let Some(s) = v.as_str() {
        return finite_f64(s);
    }
    None
}

/// Parse a float, refusing NaN and infinities
pub fn finite_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Pick a non-empty string value from a JSON object
pub fn s_pick(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a user supplied date or date-time; bare dates resolve to midnight
pub fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in [CATALOG_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// First and last second of the day containing `instant`
pub fn day_bounds(instant: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let day = instant.date();
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    (day.and_time(NaiveTime::MIN), day.and_time(end))
}

/// Catalog acquisition time, either a date string or epoch milliseconds
pub fn collect_time(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

/// Human readable acquisition time, e.g. "Wednesday January 1st 2020 12:00:00 am"
pub fn human_time(t: NaiveDateTime) -> String {
    format!(
        "{} {}{} {}",
        t.format("%A %B"),
        t.day(),
        ordinal_suffix(t.day()),
        t.format("%Y %-I:%M:%S %P")
    )
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
