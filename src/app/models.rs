//! Data models for station telemetry
//!
//! This module contains the canonical observation and health records that every
//! decoder and adapter produces, plus the station configuration records that the
//! ingestion pipeline consumes.

use crate::constants::ONLINE_THRESHOLD_MINUTES;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Observation Record Structure
// =============================================================================

/// Canonical meteorological sample
///
/// Every measurement is optional: `None` means the reading was absent, unparsable
/// or a sentinel, and is never conflated with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationObservation {
    /// Numeric station identifier, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<i64>,

    /// Primary observation timestamp
    pub timestamp: DateTime<Utc>,

    /// Air temperature (°C)
    pub temperature: Option<f64>,

    /// Relative humidity (%)
    pub humidity: Option<f64>,

    /// Station pressure (mbar)
    pub pressure: Option<f64>,

    /// Mean-sea-level pressure (mbar)
    pub msl_pressure: Option<f64>,

    /// Dew point (°C)
    pub dew_point: Option<f64>,

    /// Heat index (°C)
    pub heat_index: Option<f64>,

    /// Wind chill (°C)
    pub wind_chill: Option<f64>,

    /// Wind speed (m/s)
    pub wind_speed: Option<f64>,

    /// Wind gust (m/s)
    pub wind_gust: Option<f64>,

    /// Wind direction (degrees)
    pub wind_direction: Option<f64>,

    /// Solar radiation (W/m²)
    pub solar_radiation: Option<f64>,

    /// Rain rate (mm, or raw tip count for the comma telegram)
    pub rain_rate: Option<f64>,

    /// Rain accumulation (mm, or cumulative tip count for the comma telegram)
    pub rain_accumulation: Option<f64>,

    /// Daily maximum temperature (°C)
    pub temperature_max: Option<f64>,

    /// Time of the daily maximum temperature
    pub temperature_max_time: Option<DateTime<Utc>>,

    /// Daily minimum temperature (°C)
    pub temperature_min: Option<f64>,

    /// Time of the daily minimum temperature
    pub temperature_min_time: Option<DateTime<Utc>>,

    /// Time of the strongest gust
    pub gust_time: Option<DateTime<Utc>>,
}

impl StationObservation {
    /// Create an observation with every measurement absent
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            station_id: None,
            timestamp,
            temperature: None,
            humidity: None,
            pressure: None,
            msl_pressure: None,
            dew_point: None,
            heat_index: None,
            wind_chill: None,
            wind_speed: None,
            wind_gust: None,
            wind_direction: None,
            solar_radiation: None,
            rain_rate: None,
            rain_accumulation: None,
            temperature_max: None,
            temperature_max_time: None,
            temperature_min: None,
            temperature_min_time: None,
            gust_time: None,
        }
    }

    /// Attach the station identifier
    pub fn with_station_id(mut self, station_id: i64) -> Self {
        self.station_id = Some(station_id);
        self
    }
}

// =============================================================================
// Health Record Structure
// =============================================================================

/// Diagnostic sample paired 1:1 with a [`StationObservation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationHealth {
    /// Numeric station identifier, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<i64>,

    /// Mirrors the observation timestamp
    pub timestamp: DateTime<Utc>,

    /// Primary battery voltage (V)
    pub battery_voltage_1: Option<f64>,

    /// Secondary battery voltage (V)
    pub battery_voltage_2: Option<f64>,

    /// Current draw (A)
    pub current: Option<f64>,

    /// First onboard barometer (mbar)
    pub barometer_1: Option<f64>,

    /// Second onboard barometer (mbar)
    pub barometer_2: Option<f64>,

    /// Communication mode label (e.g. "GSM", "SAT")
    pub comm_mode: Option<String>,

    /// Signal strength as reported by the modem
    pub signal_strength: Option<i64>,

    /// Onboard reference temperature (°C)
    pub reference_temperature: Option<f64>,

    /// Onboard reference humidity (%)
    pub reference_humidity: Option<f64>,

    /// Firmware mode label
    pub firmware_mode: Option<String>,

    /// Raw source message as received
    pub raw_message: String,

    /// Human-readable anomaly description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,

    /// Number of tracked observation fields that parsed
    pub data_count: u32,

    /// Fixed-width '0'/'1' flags, one per tracked observation field
    pub data_status: String,

    /// Wall clock minus telegram timestamp, in minutes
    pub drift_minutes: i64,
}

impl StationHealth {
    /// Create a health record with no diagnostics populated
    pub fn empty(timestamp: DateTime<Utc>, raw_message: impl Into<String>) -> Self {
        Self {
            station_id: None,
            timestamp,
            battery_voltage_1: None,
            battery_voltage_2: None,
            current: None,
            barometer_1: None,
            barometer_2: None,
            comm_mode: None,
            signal_strength: None,
            reference_temperature: None,
            reference_humidity: None,
            firmware_mode: None,
            raw_message: raw_message.into(),
            error_msg: None,
            data_count: 0,
            data_status: String::new(),
            drift_minutes: 0,
        }
    }

    /// Attach the station identifier
    pub fn with_station_id(mut self, station_id: i64) -> Self {
        self.station_id = Some(station_id);
        self
    }

    /// Whether the decoder annotated this record with an anomaly
    pub fn has_anomaly(&self) -> bool {
        self.error_msg.as_deref().is_some_and(|m| !m.is_empty())
    }
}

// =============================================================================
// Station Status
// =============================================================================

/// Station connectivity derived from observation recency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StationStatus {
    Online,
    Offline,
}

impl StationStatus {
    /// ONLINE when the observation is no older than the online threshold
    pub fn derive(observed_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now - observed_at <= Duration::minutes(ONLINE_THRESHOLD_MINUTES) {
            StationStatus::Online
        } else {
            StationStatus::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Online => "ONLINE",
            StationStatus::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Telegram Formats and Buffered Records
// =============================================================================

/// Wire formats accepted on the push path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelegramFormat {
    /// `+`-delimited telegram (19/20/23/24 fields)
    Plus,
    /// `,`-delimited telegram (27+ fields)
    Comma,
}

/// A decoded telegram held by the persistence layer until it is promoted to current
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferedTelegram {
    pub station_id: i64,
    pub observation: StationObservation,
    pub health: StationHealth,
}

// =============================================================================
// Station Configuration
// =============================================================================

/// Where a station's telemetry comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Polled from the cloud vendor
    Cloud,
    /// Pushed by the station hardware as telegrams
    Telegram,
}

/// Credential fields exactly as stored in configuration
///
/// These are resolved once into a `CloudCredentials` variant before any call is made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCredentials {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub station_uuid: Option<String>,
}

/// Per-station configuration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Local station identifier
    pub station_id: i64,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Whether the station should be polled at all
    #[serde(default)]
    pub active: bool,

    /// Telemetry source
    pub source: SourceKind,

    /// Upstream endpoint for cloud-backed stations
    #[serde(default)]
    pub source_url: Option<String>,

    /// Upstream station identifier used to pick one reading from a keyed listing
    #[serde(default)]
    pub remote_station_id: Option<String>,

    /// Credential fields
    #[serde(default)]
    pub credentials: RawCredentials,
}

impl StationConfig {
    /// Create a cloud-backed station configuration
    pub fn cloud(station_id: i64, source_url: impl Into<String>, credentials: RawCredentials) -> Self {
        Self {
            station_id,
            name: format!("station-{}", station_id),
            active: true,
            source: SourceKind::Cloud,
            source_url: Some(source_url.into()),
            remote_station_id: None,
            credentials,
        }
    }

    /// Whether the station is cloud-backed
    pub fn is_cloud(&self) -> bool {
        self.source == SourceKind::Cloud
    }
}
