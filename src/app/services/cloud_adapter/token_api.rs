//! Legacy token cloud API (v1)
//!
//! One call returns one station; any failure fails the whole call.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use super::client::{FetchRequest, HttpFetcher};
use super::json_value::{lenient_f64, parse_body};
use super::local_time::{anchor_to_today, parse_meridiem_time};
use super::{CloudReading, FetchOutcome};
use crate::app::models::StationObservation;
use crate::app::services::field_parsers::{
    fahrenheit_to_celsius, inches_to_mm, inhg_to_mbar, mph_to_ms,
};
use crate::{Error, Result};

const CONTEXT: &str = "token API response";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    observation_time_rfc822: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    relative_humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    dewpoint_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    heat_index_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    windchill_f: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_mph: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_degrees: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pressure_in: Option<f64>,
    #[serde(default)]
    davis_current_observation: DavisObservation,
}

#[derive(Debug, Default, Deserialize)]
struct DavisObservation {
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_day_high_f: Option<f64>,
    #[serde(default)]
    temp_day_high_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp_day_low_f: Option<f64>,
    #[serde(default)]
    temp_day_low_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_ten_min_gust_mph: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    rain_rate_in_per_hr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    rain_day_in: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    solar_radiation: Option<f64>,
}

fn extremum_time(
    value: Option<&str>,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    parse_meridiem_time(value?).and_then(|t| anchor_to_today(t, offset, now))
}

/// Decode a token API body into an observation
pub fn parse_token_response(
    body: &str,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<StationObservation> {
    let response: TokenResponse = parse_body(CONTEXT, body)?;

    let raw_time = response
        .observation_time_rfc822
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::missing_field(CONTEXT, "observation_time_rfc822"))?;
    let timestamp = DateTime::parse_from_rfc2822(raw_time)
        .map_err(|_| Error::invalid_value(CONTEXT, "observation_time_rfc822", raw_time))?
        .with_timezone(&Utc);

    let davis = &response.davis_current_observation;
    Ok(StationObservation {
        temperature: response.temp_f.map(fahrenheit_to_celsius),
        humidity: response.relative_humidity,
        dew_point: response.dewpoint_f.map(fahrenheit_to_celsius),
        heat_index: response.heat_index_f.map(fahrenheit_to_celsius),
        wind_chill: response.windchill_f.map(fahrenheit_to_celsius),
        wind_speed: response.wind_mph.map(mph_to_ms),
        wind_direction: response.wind_degrees,
        pressure: response.pressure_in.map(inhg_to_mbar),
        temperature_max: davis.temp_day_high_f.map(fahrenheit_to_celsius),
        temperature_max_time: extremum_time(davis.temp_day_high_time.as_deref(), offset, now),
        temperature_min: davis.temp_day_low_f.map(fahrenheit_to_celsius),
        temperature_min_time: extremum_time(davis.temp_day_low_time.as_deref(), offset, now),
        wind_gust: davis.wind_ten_min_gust_mph.map(mph_to_ms),
        rain_rate: davis.rain_rate_in_per_hr.map(inches_to_mm),
        rain_accumulation: davis.rain_day_in.map(inches_to_mm),
        solar_radiation: davis.solar_radiation,
        ..StationObservation::empty(timestamp)
    })
}

/// Fetch the single station behind a user/password/token triple
pub async fn fetch_token(
    fetcher: &dyn HttpFetcher,
    url: &str,
    user: &str,
    password: &str,
    token: &str,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<FetchOutcome> {
    let request = FetchRequest::get(url)
        .query("user", user)
        .query("pass", password)
        .query("apiToken", token);
    let body = fetcher.get_text(&request).await?;
    let observation = parse_token_response(&body, offset, now)?;

    Ok(FetchOutcome {
        readings: vec![CloudReading {
            remote_station_id: None,
            observation,
        }],
        ..FetchOutcome::default()
    })
}
