//! Application constants for station telemetry processing
//!
//! This module contains wire-format constants, unit conversion factors, sanity
//! windows and default values used throughout the decoders and the pipeline.

// =============================================================================
// Sentinels and Rounding
// =============================================================================

/// Reserved "no reading" literal, honoured only for the pressure field
pub const PRESSURE_SENTINEL: f64 = 999.9;

/// Decimal places kept for decoded telegram measurements
pub const TELEGRAM_DECIMALS: u32 = 2;

// =============================================================================
// Unit Conversion Factors
// =============================================================================

/// km/h to m/s
pub const KMH_TO_MS: f64 = 1.0 / 3.6;

/// Tipping-bucket count to millimetres
pub const RAIN_TIP_TO_MM: f64 = 1.2;

/// Miles per hour to m/s
pub const MPH_TO_MS: f64 = 0.44704;

/// Inches of mercury to millibar
pub const INHG_TO_MBAR: f64 = 33.86;

/// Inches to millimetres
pub const INCH_TO_MM: f64 = 25.4;

// =============================================================================
// Timestamp Sanity Window
// =============================================================================

/// Telegrams older than this are clamped to decode time
pub const MAX_TIMESTAMP_AGE_DAYS: i64 = 90;

/// Telegrams further in the future than this are clamped to decode time
pub const MAX_TIMESTAMP_LEAD_DAYS: i64 = 1;

/// Observations newer than this mark a station ONLINE
pub const ONLINE_THRESHOLD_MINUTES: i64 = 60;

/// Default station UTC offset (+08:00)
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 8 * 60;

// =============================================================================
// Plus Telegram Wire Format
// =============================================================================

pub mod plus_telegram {
    /// Field delimiter
    pub const DELIMITER: char = '+';

    /// Optional leading marker on the raw telegram
    pub const PREFIX: &str = ">";

    /// URL-encoded space that some modems emit instead of the delimiter
    pub const ENCODED_SPACE: &str = "%20";

    /// Marker trailing the first battery voltage in the compact layouts
    pub const VOLTAGE_MARKER: char = '#';

    /// Trailer written by the encoder after the timestamp
    pub const TRAILER: &str = "END";

    /// Smallest token count accepted
    pub const MIN_FIELDS: usize = 19;

    /// Position of the placeholder token in variants 20 and 24 (after the sequence number is dropped)
    pub const PLACEHOLDER_INDEX: usize = 5;

    /// Number of tracked observation fields
    pub const TRACKED_FIELDS: usize = 10;
}

// =============================================================================
// Comma Telegram Wire Format
// =============================================================================

pub mod comma_telegram {
    /// Field delimiter
    pub const DELIMITER: char = ',';

    /// Smallest token count accepted
    pub const MIN_FIELDS: usize = 27;

    /// First tracked observation token
    pub const OBSERVATION_START: usize = 4;

    /// First health token
    pub const HEALTH_START: usize = 15;

    /// Number of tracked observation fields
    pub const TRACKED_FIELDS: usize = 11;
}

// =============================================================================
// Cloud Vendor API
// =============================================================================

pub mod cloud {
    /// Header carrying the keyed API secret
    pub const API_SECRET_HEADER: &str = "X-Api-Secret";

    /// Client-side timeout applied to every outbound call
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default politeness delay before each outbound call
    pub const DEFAULT_REQUEST_DELAY_MS: u64 = 250;

    /// User agent sent to upstream APIs
    pub const USER_AGENT: &str = concat!("station-telemetry/", env!("CARGO_PKG_VERSION"));

    /// Label that qualifies sensor type 20 as the rain accumulation reading
    pub const RAIN_ACCUMULATION_LABEL: &str = "60 Min Rain Total";

    /// Dashboard sensor-type codes
    pub mod sensor_codes {
        pub const TEMPERATURE: i64 = 7;
        pub const HEAT_INDEX: i64 = 12;
        pub const HUMIDITY: i64 = 14;
        pub const WIND_SPEED: i64 = 15;
        pub const WIND_DIRECTION: i64 = 17;
        pub const RAIN_ACCUMULATION: i64 = 20;
        pub const RAIN_RATE: i64 = 22;
        pub const PRESSURE: i64 = 26;
        pub const SOLAR_RADIATION: i64 = 28;
        pub const DAILY_HIGH_TEMPERATURE: i64 = 57;
        pub const DAILY_LOW_TEMPERATURE: i64 = 58;
        pub const WIND_GUST: i64 = 65;
    }
}

// =============================================================================
// Pipeline Pacing
// =============================================================================

/// Lower bound of the randomized inter-station delay
pub const DEFAULT_MIN_STATION_DELAY_MS: u64 = 1_000;

/// Upper bound of the randomized inter-station delay
pub const DEFAULT_MAX_STATION_DELAY_MS: u64 = 5_000;

/// Default config file name under the user config directory
pub const CONFIG_FILE_NAME: &str = "station-telemetry.yaml";
