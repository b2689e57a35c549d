//! Configuration management and validation.
//!
//! Provides the HTTP, pacing and station settings used by the cloud adapter and the
//! ingestion pipeline. Values are layered: built-in defaults, then the YAML file,
//! then `TELEMETRY_*` environment variables, then CLI overrides.

use crate::app::models::StationConfig;
use crate::constants::cloud::{DEFAULT_REQUEST_DELAY_MS, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_MAX_STATION_DELAY_MS, DEFAULT_MIN_STATION_DELAY_MS,
    DEFAULT_UTC_OFFSET_MINUTES,
};
use crate::{Error, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the HTTP timeout (seconds)
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TELEMETRY_HTTP_TIMEOUT_SECS";

/// Environment variable overriding the pre-request delay (milliseconds)
pub const ENV_REQUEST_DELAY_MS: &str = "TELEMETRY_REQUEST_DELAY_MS";

/// Environment variable overriding the station UTC offset (minutes east)
pub const ENV_UTC_OFFSET_MINUTES: &str = "TELEMETRY_UTC_OFFSET_MINUTES";

/// Largest UTC offset accepted, in minutes
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Client-side timeout for each call
    pub timeout_secs: u64,

    /// Politeness delay before each call
    pub request_delay_ms: u64,

    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Randomized delay between stations in one polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_station_delay_ms: u64,
    pub max_station_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_station_delay_ms: DEFAULT_MIN_STATION_DELAY_MS,
            max_station_delay_ms: DEFAULT_MAX_STATION_DELAY_MS,
        }
    }
}

impl PacingConfig {
    /// No delay at all
    pub fn immediate() -> Self {
        Self {
            min_station_delay_ms: 0,
            max_station_delay_ms: 0,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,

    pub pacing: PacingConfig,

    /// Fixed UTC offset of the station network, in minutes east
    pub station_utc_offset_minutes: i32,

    pub stations: Vec<StationConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            pacing: PacingConfig::default(),
            station_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            stations: Vec::new(),
        }
    }
}

impl Config {
    /// `<user config dir>/station-telemetry.yaml`, when a config dir exists
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Parse a YAML config file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_yaml_str(&contents, &path.display().to_string())
    }

    pub fn from_yaml_str(contents: &str, origin: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| Error::yaml(origin, e))
    }

    /// Defaults, then the file (explicit path, else the default path if present),
    /// then environment overrides; validated
    pub fn load_layered(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => match Self::default_config_path().filter(|p| p.exists()) {
                Some(default_path) => {
                    debug!("Loading config from {}", default_path.display());
                    Self::from_yaml_file(&default_path)?
                }
                None => Self::default(),
            },
        };

        let config = config.with_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TELEMETRY_*` overrides read through `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http.timeout_secs = parse_env(ENV_HTTP_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_REQUEST_DELAY_MS) {
            self.http.request_delay_ms = parse_env(ENV_REQUEST_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_UTC_OFFSET_MINUTES) {
            self.station_utc_offset_minutes = parse_env(ENV_UTC_OFFSET_MINUTES, &value)?;
        }
        Ok(self)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(Error::configuration("HTTP timeout must be greater than zero"));
        }
        if self.pacing.min_station_delay_ms > self.pacing.max_station_delay_ms {
            return Err(Error::configuration(format!(
                "Station delay bounds are inverted: min {} ms > max {} ms",
                self.pacing.min_station_delay_ms, self.pacing.max_station_delay_ms
            )));
        }
        if self.station_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(Error::configuration(format!(
                "Station UTC offset of {} minutes is outside ±14 hours",
                self.station_utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Station zone as a chrono offset
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.station_utc_offset_minutes * 60).ok_or_else(|| {
            Error::configuration(format!(
                "Invalid UTC offset: {} minutes",
                self.station_utc_offset_minutes
            ))
        })
    }

    /// Create configuration with a custom HTTP timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.http.timeout_secs = timeout_secs;
        self
    }

    /// Create configuration with custom inter-station pacing
    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.station_utc_offset_minutes = minutes;
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::configuration(format!("{} has an invalid value '{}'", name, value))
    })
}
