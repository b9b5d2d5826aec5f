//! Small numeric and calendar helpers

use chrono::{DateTime, Duration, NaiveTime, TimeZone};

/// Round half away from zero
pub fn round(value: f64) -> f64 {
    if value < 0.0 {
        (value - 0.5).ceil()
    } else {
        (value + 0.5).floor()
    }
}

/// Round to `places` decimal places, half away from zero
pub fn round_places(value: f64, places: i32) -> f64 {
    let shift = 10f64.powi(places);
    round(value * shift) / shift
}

/// Midnight at the start of `time`'s day, in the same time zone
///
/// On days where local midnight does not exist (a DST gap), the earliest
/// valid instant of that day is returned.
pub fn beginning_of_day<Tz: TimeZone>(time: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = time.timezone();
    let mut local = time.date_naive().and_time(NaiveTime::MIN);
    loop {
        if let Some(start) = tz.from_local_datetime(&local).earliest() {
            return start;
        }
        local += Duration::minutes(15);
    }
}
