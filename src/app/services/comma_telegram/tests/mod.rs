//! Test fixtures for comma-telegram decoding

use chrono::{DateTime, TimeZone, Utc};


pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Tracked observation tokens in wire order
pub const OBSERVATION_TOKENS: [&str; 11] = [
    "24.3", "71", "1009.8", "7.2", "14.4", "225", "610", "18.9", "24.3", "3", "148",
];

pub const HEALTH_TOKENS: [&str; 7] = ["12.8", "12.7", "0.42", "1009.5", "1009.9", "31.2", "40.5"];

/// Build a 27-field telegram for station 3107 at the given epoch
pub fn comma_telegram(observation: &[&str; 11], epoch: i64) -> String {
    let epoch = epoch.to_string();
    let mut tokens = vec!["3107", "121.0345", "14.6512", epoch.as_str()];
    tokens.extend_from_slice(observation);
    tokens.extend_from_slice(&HEALTH_TOKENS);
    tokens.extend_from_slice(&["GSM", "19", "NORMAL", "", ""]);
    tokens.join(",")
}
