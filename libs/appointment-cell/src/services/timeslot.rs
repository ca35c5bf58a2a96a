use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::AppointmentError;

/// How close two slots may sit before they are considered the same slot.
pub const CONFLICT_WINDOW_MINUTES: i64 = 60;

/// Parse a 24-hour "HH:mm" wall-clock string. Malformed input is an error,
/// never a default.
pub fn parse_clock(value: &str) -> Result<NaiveTime, AppointmentError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| AppointmentError::InvalidTime(format!("'{}' is not a valid HH:mm time", value)))
}

/// Calendar day as a stored instant: midnight UTC.
pub fn normalize_date(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// Time of day as a stored instant, anchored to 1970-01-01 so values from
/// different days compare on the time axis alone.
pub fn normalize_time(time: NaiveTime) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_time(time)
        .and_utc()
}

/// The ± window around a requested time inside which a confirmed
/// appointment counts as a conflict. Bounds are inclusive.
pub fn conflict_window(time: NaiveTime) -> (DateTime<Utc>, DateTime<Utc>) {
    let anchored = normalize_time(time);
    let span = Duration::minutes(CONFLICT_WINDOW_MINUTES);
    (anchored - span, anchored + span)
}
