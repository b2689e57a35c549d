//! Time-of-day values the vendor reports without a date
//!
//! Both forms are anchored to the current date in the station's zone.

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};

/// Combine a local time of day with today's local date
pub fn anchor_to_today(
    time: NaiveTime,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    now.with_timezone(&offset)
        .date_naive()
        .and_time(time)
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse `h:mma` (e.g. `2:34pm`)
pub fn parse_meridiem_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(&value.trim().to_ascii_uppercase(), "%I:%M%p").ok()
}

/// Interpret an `HHMM` integer (e.g. `1432`, `905`)
pub fn hhmm_to_time(value: i64) -> Option<NaiveTime> {
    if value < 0 {
        return None;
    }
    NaiveTime::from_hms_opt((value / 100) as u32, (value % 100) as u32, 0)
}
