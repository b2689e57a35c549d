//! Test utilities for the cloud adapter
//!
//! [`ScriptedFetcher`] serves canned bodies keyed by URL and records every request,
//! so adapter and pipeline tests never touch the network.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::app::services::cloud_adapter::{CloudAdapter, FetchRequest, HttpFetcher};
use crate::{Error, Result};


pub const KEYED_BASE: &str = "https://cloud.test/v2";
pub const TOKEN_URL: &str = "https://cloud.test/v1/NoaaExt.json";
pub const DASHBOARD_BASE: &str = "https://cloud.test/summary";

#[derive(Debug, Clone)]
enum Scripted {
    Body(String),
    Status(u16),
}

/// Canned upstream responses keyed by URL (query string excluded)
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), Scripted::Body(body.into()));
        self
    }

    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), Scripted::Status(status));
        self
    }

    /// Every request seen so far, in order
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn get_text(&self, request: &FetchRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self.responses.lock().unwrap().get(&request.url).cloned();
        match scripted {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(status)) => Err(Error::transport(
                request.url.clone(),
                format!("HTTP {}", status),
            )),
            None => Err(Error::transport(request.url.clone(), "connection refused")),
        }
    }
}

pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// 2024-06-15 20:00 at +08:00
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn adapter(fetcher: Arc<ScriptedFetcher>) -> CloudAdapter {
    CloudAdapter::new(fetcher, offset())
}

/// Local time on the `fixed_now()` date, in UTC
pub fn local_today(hour: u32, minute: u32) -> DateTime<Utc> {
    offset()
        .with_ymd_and_hms(2024, 6, 15, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn keyed_listing(ids: &[i64]) -> String {
    let stations: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| serde_json::json!({ "station_id": id, "station_name": format!("Station {}", id) }))
        .collect();
    serde_json::json!({ "stations": stations }).to_string()
}

/// Current conditions split over two sensor blocks, as the vendor sends them
pub fn keyed_current(station_id: i64, ts: i64) -> String {
    serde_json::json!({
        "station_id": station_id,
        "sensors": [
            { "lsid": 1, "data": [{
                "ts": ts,
                "temp": 77.0,
                "hum": 60.5,
                "dew_point": null,
                "heat_index": 80.0,
                "wind_speed_last": 10.0,
                "wind_dir_last": 180,
                "wind_speed_hi_last_10_min": 15.0,
                "rain_rate_last_in": 0.1,
                "rainfall_daily_in": 0.5,
                "solar_rad": 512
            }]},
            { "lsid": 2, "data": [{
                "ts": ts - 60,
                "temp": 99.0,
                "dew_point": 62.0,
                "wind_chill": 77.0,
                "bar_sea_level": 29.92,
                "bar_absolute": 29.5
            }]}
        ]
    })
    .to_string()
}

pub fn token_body() -> String {
    serde_json::json!({
        "observation_time_rfc822": "Sat, 15 Jun 2024 19:55:00 +0800",
        "temp_f": "86.0",
        "relative_humidity": "65",
        "dewpoint_f": 73.0,
        "heat_index_f": "95.0",
        "windchill_f": "86.0",
        "wind_mph": "10.0",
        "wind_degrees": "225",
        "pressure_in": "29.92",
        "davis_current_observation": {
            "temp_day_high_f": "91.0",
            "temp_day_high_time": "2:34pm",
            "temp_day_low_f": "77.0",
            "temp_day_low_time": "5:50am",
            "wind_ten_min_gust_mph": "20.0",
            "rain_rate_in_per_hr": "0.20",
            "rain_day_in": "1.00",
            "solar_radiation": "640"
        }
    })
    .to_string()
}

pub fn dashboard_body(last_received_ms: i64) -> String {
    serde_json::json!({
        "lastReceived": last_received_ms,
        "currConditionValues": [
            { "sensorDataTypeId": 7, "sensorDataName": "Temp", "convertedValue": "28.4" },
            { "sensorDataTypeId": 14, "sensorDataName": "Hum", "convertedValue": "71" },
            { "sensorDataTypeId": 15, "sensorDataName": "Wind Speed", "convertedValue": "10" },
            { "sensorDataTypeId": 17, "sensorDataName": "Wind Direction", "convertedValue": "90" },
            { "sensorDataTypeId": 20, "sensorDataName": "Daily Rain", "convertedValue": "9.9" },
            { "sensorDataTypeId": 20, "sensorDataName": "60 Min Rain Total", "convertedValue": "3.2" },
            { "sensorDataTypeId": 22, "sensorDataName": "Rain Rate", "convertedValue": "--" },
            { "sensorDataTypeId": 26, "sensorDataName": "Barometer", "convertedValue": "1008.6" },
            { "sensorDataTypeId": 28, "sensorDataName": "Solar Rad", "convertedValue": 455 },
            { "sensorDataTypeId": 65, "sensorDataName": "High Wind Gust", "convertedValue": "30" },
            { "sensorDataTypeId": 99, "sensorDataName": "Unknown", "convertedValue": "1" }
        ],
        "highLowValues": [
            { "sensorDataTypeId": 57, "sensorDataName": "High Temp", "convertedValue": "31.2" },
            { "sensorDataTypeId": 58, "sensorDataName": "Low Temp", "convertedValue": "24.9" },
            { "sensorDataTypeId": 7, "sensorDataName": "Temp", "convertedValue": "0" }
        ],
        "hiTempTime": 1432,
        "loTempTime": 550,
        "hiWindGustTime": "1305"
    })
    .to_string()
}
