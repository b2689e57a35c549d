//! Comma-telegram decoding
//!
//! Layout: `[0]` station id, `[1]` longitude, `[2]` latitude, `[3]` unix epoch seconds,
//! `[4..15]` tracked observation fields, `[15..22]` health, `[22..27]` reserved.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::app::models::{StationHealth, StationObservation};
use crate::app::services::field_parsers::{
    parse_float_field, parse_int_field, parse_optional_float, round_to,
};
use crate::app::services::telemetry_quality::{DataStatus, annotate_health, sanitize_timestamp};
use crate::constants::comma_telegram::{
    DELIMITER, HEALTH_START, MIN_FIELDS, OBSERVATION_START, TRACKED_FIELDS,
};
use crate::constants::{KMH_TO_MS, TELEGRAM_DECIMALS};
use crate::{Error, Result};

/// A decoded comma telegram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommaTelegram {
    pub station_id: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub observation: StationObservation,
    pub health: StationHealth,
}

type Assign<T> = fn(&mut T, Option<f64>);

/// How a tracked token is read off the wire
#[derive(Clone, Copy)]
enum TokenKind {
    Decimal { scale: f64, reject_sentinel: bool },
    /// Whole counts only; `2.5` tips is not a reading
    Count,
}

struct TrackedField {
    name: &'static str,
    kind: TokenKind,
    assign: Assign<StationObservation>,
}

const fn tracked(name: &'static str, scale: f64, assign: Assign<StationObservation>) -> TrackedField {
    TrackedField {
        name,
        kind: TokenKind::Decimal {
            scale,
            reject_sentinel: false,
        },
        assign,
    }
}

const fn counted(name: &'static str, assign: Assign<StationObservation>) -> TrackedField {
    TrackedField {
        name,
        kind: TokenKind::Count,
        assign,
    }
}

const OBSERVATION_FIELDS: [TrackedField; TRACKED_FIELDS] = [
    tracked("temperature", 1.0, |o, v| o.temperature = v),
    tracked("humidity", 1.0, |o, v| o.humidity = v),
    TrackedField {
        name: "pressure",
        kind: TokenKind::Decimal {
            scale: 1.0,
            reject_sentinel: true,
        },
        assign: |o, v| o.pressure = v,
    },
    tracked("wind_speed", KMH_TO_MS, |o, v| o.wind_speed = v),
    tracked("wind_gust", KMH_TO_MS, |o, v| o.wind_gust = v),
    tracked("wind_direction", 1.0, |o, v| o.wind_direction = v),
    tracked("solar_radiation", 1.0, |o, v| o.solar_radiation = v),
    tracked("dew_point", 1.0, |o, v| o.dew_point = v),
    tracked("wind_chill", 1.0, |o, v| o.wind_chill = v),
    // Tip counts are stored as delivered
    counted("rain_tips", |o, v| o.rain_rate = v),
    counted("rain_tips_total", |o, v| o.rain_accumulation = v),
];

const HEALTH_FIELDS: [(&str, Assign<StationHealth>); 7] = [
    ("battery_voltage_1", |h, v| h.battery_voltage_1 = v),
    ("battery_voltage_2", |h, v| h.battery_voltage_2 = v),
    ("current", |h, v| h.current = v),
    ("barometer_1", |h, v| h.barometer_1 = v),
    ("barometer_2", |h, v| h.barometer_2 = v),
    ("reference_temperature", |h, v| h.reference_temperature = v),
    ("reference_humidity", |h, v| h.reference_humidity = v),
];

fn decode_value(name: &str, token: &str, scale: f64, reject_sentinel: bool) -> Option<f64> {
    match parse_float_field(name, token, reject_sentinel) {
        Ok(value) => Some(round_to(value * scale, TELEGRAM_DECIMALS)),
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}

fn decode_tracked(field: &TrackedField, token: &str) -> Option<f64> {
    match field.kind {
        TokenKind::Decimal {
            scale,
            reject_sentinel,
        } => decode_value(field.name, token, scale, reject_sentinel),
        TokenKind::Count => match parse_int_field(field.name, token) {
            Ok(count) => Some(count as f64),
            Err(e) => {
                debug!("{}", e);
                None
            }
        },
    }
}

/// Decode a raw comma telegram relative to the wall-clock time `now`
pub fn decode_comma_telegram(raw: &str, now: DateTime<Utc>) -> Result<CommaTelegram> {
    let trimmed = raw.trim();
    let tokens: Vec<&str> = trimmed.split(DELIMITER).collect();

    if tokens.len() < MIN_FIELDS {
        return Err(Error::format(format!(
            "Comma telegram has {} fields, at least {} required",
            tokens.len(),
            MIN_FIELDS
        )));
    }

    let station_id = parse_int_field("station_id", tokens[0])
        .map_err(|e| Error::format(format!("Invalid station id: {}", e)))?;

    let epoch = parse_int_field("timestamp", tokens[3])
        .map_err(|e| Error::format(format!("Invalid epoch timestamp: {}", e)))?;
    let telegram_ts = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| Error::format(format!("Epoch timestamp {} out of range", epoch)))?;
    let sanitized = sanitize_timestamp(telegram_ts, now);

    let mut observation = StationObservation::empty(sanitized.timestamp).with_station_id(station_id);
    let mut flags = Vec::with_capacity(TRACKED_FIELDS);
    for (field, token) in OBSERVATION_FIELDS
        .iter()
        .zip(&tokens[OBSERVATION_START..OBSERVATION_START + TRACKED_FIELDS])
    {
        let value = decode_tracked(field, token);
        flags.push(value.is_some());
        (field.assign)(&mut observation, value);
    }

    let mut health = StationHealth::empty(sanitized.timestamp, trimmed).with_station_id(station_id);
    for ((name, assign), token) in HEALTH_FIELDS
        .iter()
        .zip(&tokens[HEALTH_START..HEALTH_START + HEALTH_FIELDS.len()])
    {
        assign(&mut health, decode_value(name, token, 1.0, false));
    }

    let status = DataStatus::from_flags(flags);
    debug!(
        "Decoded comma telegram for station {}: data status {}",
        station_id, status
    );

    Ok(CommaTelegram {
        station_id,
        longitude: parse_optional_float(tokens[1], false),
        latitude: parse_optional_float(tokens[2], false),
        observation,
        health: annotate_health(health, &status, &sanitized),
    })
}
