use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;

/// Chart labels arrive as fractional Unix seconds.
pub fn datetime_from_secs(ts: f64, tz: &Tz) -> Option<DateTime<Tz>> {
    if !ts.is_finite() {
        return None;
    }
    let millis = (ts * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(tz))
}

/// Whether the timestamp sits at minute zero of an hour in `tz`.
/// Half-hour offset zones make this differ from `ts % 3600 == 0`.
pub fn is_on_the_hour(ts: f64, tz: &Tz) -> bool {
    datetime_from_secs(ts, tz).is_some_and(|dt| dt.minute() == 0)
}

/// Identifies the wall-clock hour `dt` falls in, for rollover detection.
pub fn hour_key(dt: &DateTime<Tz>) -> (i32, u32, u32) {
    (dt.year(), dt.ordinal(), dt.hour())
}
