//! Public dashboard scrape
//!
//! The dashboard reports readings as a list of `(sensor type, label, value)` entries.
//! [`SENSOR_TABLE`] maps sensor types onto observation fields.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use tracing::debug;

use super::client::{FetchRequest, HttpFetcher};
use super::json_value::{lenient_f64, lenient_i64, parse_body};
use super::local_time::{anchor_to_today, hhmm_to_time};
use super::{CloudReading, FetchOutcome};
use crate::app::models::StationObservation;
use crate::app::services::field_parsers::mph_to_ms;
use crate::constants::cloud::{RAIN_ACCUMULATION_LABEL, sensor_codes};
use crate::{Error, Result};

const CONTEXT: &str = "dashboard summary";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardSummary {
    #[serde(default, deserialize_with = "lenient_i64")]
    last_received: Option<i64>,
    #[serde(default)]
    curr_condition_values: Vec<SensorValue>,
    #[serde(default)]
    high_low_values: Vec<SensorValue>,
    #[serde(default, deserialize_with = "lenient_i64")]
    hi_temp_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    lo_temp_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    hi_wind_gust_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorValue {
    #[serde(default, deserialize_with = "lenient_i64")]
    sensor_data_type_id: Option<i64>,
    #[serde(default)]
    sensor_data_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    converted_value: Option<f64>,
}

/// Observation field a dashboard sensor type feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardField {
    Temperature,
    HeatIndex,
    Humidity,
    WindSpeed,
    WindDirection,
    RainAccumulation,
    RainRate,
    Pressure,
    SolarRadiation,
    DailyHighTemperature,
    DailyLowTemperature,
    WindGust,
}

impl DashboardField {
    fn slot(self, observation: &mut StationObservation) -> &mut Option<f64> {
        match self {
            DashboardField::Temperature => &mut observation.temperature,
            DashboardField::HeatIndex => &mut observation.heat_index,
            DashboardField::Humidity => &mut observation.humidity,
            DashboardField::WindSpeed => &mut observation.wind_speed,
            DashboardField::WindDirection => &mut observation.wind_direction,
            DashboardField::RainAccumulation => &mut observation.rain_accumulation,
            DashboardField::RainRate => &mut observation.rain_rate,
            DashboardField::Pressure => &mut observation.pressure,
            DashboardField::SolarRadiation => &mut observation.solar_radiation,
            DashboardField::DailyHighTemperature => &mut observation.temperature_max,
            DashboardField::DailyLowTemperature => &mut observation.temperature_min,
            DashboardField::WindGust => &mut observation.wind_gust,
        }
    }
}

/// One row of the sensor-type lookup table
#[derive(Debug, Clone, Copy)]
pub struct SensorMapping {
    pub code: i64,
    pub field: DashboardField,
    /// Values are delivered in mph and converted to m/s
    pub mph: bool,
    /// Only entries carrying this label qualify
    pub label: Option<&'static str>,
    pub enabled: bool,
}

const fn mapping(code: i64, field: DashboardField) -> SensorMapping {
    SensorMapping {
        code,
        field,
        mph: false,
        label: None,
        enabled: true,
    }
}

pub const SENSOR_TABLE: [SensorMapping; 12] = [
    mapping(sensor_codes::TEMPERATURE, DashboardField::Temperature),
    mapping(sensor_codes::HEAT_INDEX, DashboardField::HeatIndex),
    mapping(sensor_codes::HUMIDITY, DashboardField::Humidity),
    SensorMapping {
        mph: true,
        ..mapping(sensor_codes::WIND_SPEED, DashboardField::WindSpeed)
    },
    mapping(sensor_codes::WIND_DIRECTION, DashboardField::WindDirection),
    SensorMapping {
        label: Some(RAIN_ACCUMULATION_LABEL),
        ..mapping(sensor_codes::RAIN_ACCUMULATION, DashboardField::RainAccumulation)
    },
    mapping(sensor_codes::RAIN_RATE, DashboardField::RainRate),
    mapping(sensor_codes::PRESSURE, DashboardField::Pressure),
    mapping(sensor_codes::SOLAR_RADIATION, DashboardField::SolarRadiation),
    mapping(sensor_codes::DAILY_HIGH_TEMPERATURE, DashboardField::DailyHighTemperature),
    mapping(sensor_codes::DAILY_LOW_TEMPERATURE, DashboardField::DailyLowTemperature),
    // Gust readings on the dashboard are unreliable
    SensorMapping {
        mph: true,
        enabled: false,
        ..mapping(sensor_codes::WIND_GUST, DashboardField::WindGust)
    },
];

fn lookup(code: i64, label: Option<&str>) -> Option<&'static SensorMapping> {
    SENSOR_TABLE.iter().find(|m| {
        m.code == code && m.enabled && m.label.is_none_or(|required| label == Some(required))
    })
}

fn extremum_time(
    hhmm: Option<i64>,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    hhmm_to_time(hhmm?).and_then(|t| anchor_to_today(t, offset, now))
}

/// Decode a dashboard summary body into an observation
pub fn parse_dashboard(
    body: &str,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<StationObservation> {
    let summary: DashboardSummary = parse_body(CONTEXT, body)?;

    let last_received = summary
        .last_received
        .ok_or_else(|| Error::missing_field(CONTEXT, "lastReceived"))?;
    let timestamp = DateTime::from_timestamp_millis(last_received).ok_or_else(|| {
        Error::invalid_value(CONTEXT, "lastReceived", last_received.to_string())
    })?;

    let mut observation = StationObservation::empty(timestamp);
    for value in summary
        .curr_condition_values
        .iter()
        .chain(&summary.high_low_values)
    {
        let Some(code) = value.sensor_data_type_id else {
            continue;
        };
        let Some(mapping) = lookup(code, value.sensor_data_name.as_deref()) else {
            debug!("Ignoring dashboard sensor type {}", code);
            continue;
        };
        let converted = value
            .converted_value
            .map(|v| if mapping.mph { mph_to_ms(v) } else { v });

        let slot = mapping.field.slot(&mut observation);
        if slot.is_none() {
            *slot = converted;
        }
    }

    observation.temperature_max_time = extremum_time(summary.hi_temp_time, offset, now);
    observation.temperature_min_time = extremum_time(summary.lo_temp_time, offset, now);
    observation.gust_time = extremum_time(summary.hi_wind_gust_time, offset, now);

    Ok(observation)
}

/// Scrape the public dashboard of one station
pub async fn fetch_dashboard(
    fetcher: &dyn HttpFetcher,
    base_url: &str,
    station_uuid: &str,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<FetchOutcome> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), station_uuid);
    let body = fetcher.get_text(&FetchRequest::get(url)).await?;
    let observation = parse_dashboard(&body, offset, now)?;

    Ok(FetchOutcome {
        readings: vec![CloudReading {
            remote_station_id: Some(station_uuid.to_string()),
            observation,
        }],
        ..FetchOutcome::default()
    })
}
