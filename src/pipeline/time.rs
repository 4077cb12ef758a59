//! Timestamp decomposition
//!
//! Event timestamps arrive as integer epoch milliseconds. `start_time` is the
//! UTC timestamp at second precision (divide by 1000, truncate toward
//! negative infinity), and the calendar columns are derived from it once per
//! event.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Calendar decomposition of one event timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    /// Epoch seconds, UTC
    pub start_time: i64,
    /// Hour of day, 0-23
    pub hour: i32,
    /// Day of month, 1-31
    pub day: i32,
    /// ISO week number, 1-53
    pub week: i32,
    /// Month, 1-12
    pub month: i32,
    /// Calendar year
    pub year: i32,
    /// Day of week numbered from Sunday (1 = Sunday .. 7 = Saturday).
    /// An opaque ordinal; nothing downstream interprets it.
    pub weekday: i32,
}

/// Decompose epoch milliseconds into [`TimeParts`].
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn decompose_timestamp(ts_millis: i64) -> Option<TimeParts> {
    let seconds = ts_millis.div_euclid(1000);
    let datetime: DateTime<Utc> = DateTime::from_timestamp(seconds, 0)?;

    Some(TimeParts {
        start_time: seconds,
        hour: datetime.hour() as i32,
        day: datetime.day() as i32,
        week: datetime.iso_week().week() as i32,
        month: datetime.month() as i32,
        year: datetime.year(),
        weekday: datetime.weekday().number_from_sunday() as i32,
    })
}
