//! Test utilities and fixtures for plus-telegram codec testing
//!
//! Shared builders for telegrams, fully populated records and float comparison.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::app::models::{StationHealth, StationObservation};
use crate::app::services::plus_telegram::PlusTelegramCodec;


/// Station offset used throughout the tests (+08:00)
pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

pub fn codec() -> PlusTelegramCodec {
    PlusTelegramCodec::new(offset())
}

/// Wall clock used as "now" for deterministic decoding
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// `fixed_now()` rendered in the slash layout at +08:00
pub const NOW_SLASH: &str = "2024/06/15,20:00:00";

/// `fixed_now()` rendered in the colon layout at +08:00
pub const NOW_COLON: &str = "24:06:15:20:00:00";

/// Join tokens into a raw telegram with the usual prefix
pub fn telegram(tokens: &[&str]) -> String {
    format!(">{}", tokens.join("+"))
}

/// Observation tokens in wire units: temp, hum, pressure, wind km/h, gust km/h,
/// direction, solar, dew point, wind chill, rain tips
pub const OBSERVATION_TOKENS: [&str; 10] = [
    "21.5", "80", "1012.3", "6.7", "10.8", "180", "450", "18.1", "21.5", "2",
];

/// Build a full-layout (23-field) telegram around the given observation tokens
pub fn full_telegram(observation: &[&str; 10], timestamp: &str) -> String {
    let mut tokens = vec!["0001"];
    tokens.extend_from_slice(observation);
    tokens.extend_from_slice(&[
        "12.60", "12.40", "0.35", "1012.10", "1012.40", "GSM", "21", "25.30", "55.00", "NORMAL",
    ]);
    tokens.push(timestamp);
    tokens.push("END");
    telegram(&tokens)
}

/// Observation with every codec field populated
pub fn full_observation(timestamp: DateTime<Utc>) -> StationObservation {
    StationObservation {
        temperature: Some(21.5),
        humidity: Some(80.0),
        pressure: Some(1012.3),
        wind_speed: Some(5.55),
        wind_gust: Some(3.0),
        wind_direction: Some(180.0),
        solar_radiation: Some(450.0),
        dew_point: Some(18.1),
        wind_chill: Some(21.5),
        rain_rate: Some(1.2),
        ..StationObservation::empty(timestamp)
    }
}

/// Health record with every field populated
pub fn full_health(timestamp: DateTime<Utc>) -> StationHealth {
    StationHealth {
        battery_voltage_1: Some(12.6),
        battery_voltage_2: Some(12.4),
        current: Some(0.35),
        barometer_1: Some(1012.1),
        barometer_2: Some(1012.4),
        comm_mode: Some("GSM".to_string()),
        signal_strength: Some(21),
        reference_temperature: Some(25.3),
        reference_humidity: Some(55.0),
        firmware_mode: Some("NORMAL".to_string()),
        ..StationHealth::empty(timestamp, "")
    }
}

/// Round-trip tolerance on floats; the slack absorbs binary representation noise
pub const ROUND_TRIP_TOLERANCE: f64 = 0.01 + 1e-9;

/// Assert two optional floats agree within [`ROUND_TRIP_TOLERANCE`]
pub fn assert_close(label: &str, expected: Option<f64>, actual: Option<f64>) {
    match (expected, actual) {
        (Some(e), Some(a)) => assert!(
            (e - a).abs() <= ROUND_TRIP_TOLERANCE,
            "{}: expected {} got {}",
            label,
            e,
            a
        ),
        (None, None) => {}
        _ => panic!("{}: expected {:?} got {:?}", label, expected, actual),
    }
}
