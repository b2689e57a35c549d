//! Keyed cloud API (v2)
//!
//! Lists the stations owned by the key, then fetches current conditions for each.
//! One station failing never aborts the others.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::client::{FetchRequest, HttpFetcher};
use super::json_value::{lenient_f64, lenient_i64, parse_body};
use super::{CloudReading, FetchOutcome, StationFailure};
use crate::app::models::StationObservation;
use crate::app::services::field_parsers::{
    fahrenheit_to_celsius, inches_to_mm, inhg_to_mbar, mph_to_ms,
};
use crate::constants::cloud::API_SECRET_HEADER;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct StationListing {
    #[serde(default)]
    stations: Vec<ListedStation>,
}

#[derive(Debug, Deserialize)]
struct ListedStation {
    station_id: i64,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    sensors: Vec<SensorBlock>,
}

#[derive(Debug, Deserialize)]
struct SensorBlock {
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

/// Merged sensor record in vendor units
#[derive(Debug, Default, Deserialize)]
struct KeyedRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    ts: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    hum: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    dew_point: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    heat_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_chill: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_speed_last: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_dir_last: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_speed_hi_last_10_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    rain_rate_last_in: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    rainfall_daily_in: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    solar_rad: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    bar_sea_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    bar_absolute: Option<f64>,
}

/// Merge every sensor data record; the first non-null value of a field wins
fn merge_sensor_data(conditions: CurrentConditions) -> Map<String, Value> {
    let mut merged = Map::new();
    for record in conditions.sensors.into_iter().flat_map(|s| s.data) {
        for (name, value) in record {
            if value.is_null() {
                continue;
            }
            merged.entry(name).or_insert(value);
        }
    }
    merged
}

/// Decode one current-conditions body into an observation
///
/// A record without `ts` yields [`Error::MissingField`].
pub fn parse_current_conditions(body: &str) -> Result<StationObservation> {
    let conditions: CurrentConditions = parse_body("keyed current conditions", body)?;
    let record: KeyedRecord = serde_json::from_value(Value::Object(merge_sensor_data(conditions)))
        .map_err(|e| Error::decode("keyed sensor record", e))?;

    let ts = record
        .ts
        .ok_or_else(|| Error::missing_field("keyed current conditions", "ts"))?;
    let timestamp = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        Error::invalid_value("keyed current conditions", "ts", ts.to_string())
    })?;

    Ok(StationObservation {
        temperature: record.temp.map(fahrenheit_to_celsius),
        humidity: record.hum,
        dew_point: record.dew_point.map(fahrenheit_to_celsius),
        heat_index: record.heat_index.map(fahrenheit_to_celsius),
        wind_chill: record.wind_chill.map(fahrenheit_to_celsius),
        wind_speed: record.wind_speed_last.map(mph_to_ms),
        wind_direction: record.wind_dir_last,
        wind_gust: record.wind_speed_hi_last_10_min.map(mph_to_ms),
        rain_rate: record.rain_rate_last_in.map(inches_to_mm),
        rain_accumulation: record.rainfall_daily_in.map(inches_to_mm),
        solar_radiation: record.solar_rad,
        msl_pressure: record.bar_sea_level.map(inhg_to_mbar),
        pressure: record.bar_absolute.map(inhg_to_mbar),
        ..StationObservation::empty(timestamp)
    })
}

fn keyed_request(url: String, api_key: &str, api_secret: &str) -> FetchRequest {
    FetchRequest::get(url)
        .query("api-key", api_key)
        .header(API_SECRET_HEADER, api_secret)
}

/// Fetch current conditions for every station owned by the key
///
/// Only the station listing is fatal; per-station problems land in the outcome.
pub async fn fetch_keyed(
    fetcher: &dyn HttpFetcher,
    base_url: &str,
    api_key: &str,
    api_secret: &str,
) -> Result<FetchOutcome> {
    let base = base_url.trim_end_matches('/');
    let listing_body = fetcher
        .get_text(&keyed_request(format!("{}/stations", base), api_key, api_secret))
        .await?;
    let listing: StationListing = parse_body("keyed station listing", &listing_body)?;
    debug!("Keyed API lists {} stations", listing.stations.len());

    let mut outcome = FetchOutcome::default();
    for station in listing.stations {
        let remote_id = station.station_id.to_string();
        let request = keyed_request(
            format!("{}/current/{}", base, remote_id),
            api_key,
            api_secret,
        );

        let result = match fetcher.get_text(&request).await {
            Ok(body) => parse_current_conditions(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(observation) => outcome.readings.push(CloudReading {
                remote_station_id: Some(remote_id),
                observation,
            }),
            Err(Error::MissingField { field, .. }) => {
                warn!("Skipping keyed station {}: no '{}'", remote_id, field);
                outcome.skipped += 1;
            }
            Err(e) => {
                warn!("Keyed station {} failed: {}", remote_id, e);
                outcome.failures.push(StationFailure {
                    remote_station_id: remote_id,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}
