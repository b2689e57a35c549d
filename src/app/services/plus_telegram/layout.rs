//! Declarative field layouts for the four plus-telegram variants
//!
//! The decoder and the encoder both walk these tables, so a layout change is made
//! in exactly one place.

use crate::app::models::{StationHealth, StationObservation};
use crate::app::services::field_parsers::{
    parse_float_field, parse_int_field, parse_optional_float, round_to,
};
use crate::constants::plus_telegram::VOLTAGE_MARKER;
use crate::constants::{KMH_TO_MS, RAIN_TIP_TO_MM, TELEGRAM_DECIMALS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::timestamp::TimestampStyle;

// =============================================================================
// Variants
// =============================================================================

/// Telegram layout, identified by its total token count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelegramVariant {
    Compact19,
    Compact20,
    Full23,
    Full24,
}

impl TelegramVariant {
    pub const ALL: [TelegramVariant; 4] = [
        TelegramVariant::Compact19,
        TelegramVariant::Compact20,
        TelegramVariant::Full23,
        TelegramVariant::Full24,
    ];

    /// Detect the variant from the number of `+`-separated tokens
    pub fn from_field_count(count: usize) -> Option<Self> {
        match count {
            19 => Some(TelegramVariant::Compact19),
            20 => Some(TelegramVariant::Compact20),
            23 => Some(TelegramVariant::Full23),
            24 => Some(TelegramVariant::Full24),
            _ => None,
        }
    }

    /// Total token count on the wire, sequence number and trailer included
    pub fn field_count(self) -> usize {
        match self {
            TelegramVariant::Compact19 => 19,
            TelegramVariant::Compact20 => 20,
            TelegramVariant::Full23 => 23,
            TelegramVariant::Full24 => 24,
        }
    }

    /// Variants 20 and 24 carry a placeholder after the fifth observation field
    pub fn has_placeholder(self) -> bool {
        matches!(self, TelegramVariant::Compact20 | TelegramVariant::Full24)
    }

    pub fn health_layout(self) -> &'static [HealthField] {
        match self {
            TelegramVariant::Compact19 => COMPACT_19_LAYOUT,
            TelegramVariant::Compact20 => COMPACT_20_LAYOUT,
            TelegramVariant::Full23 | TelegramVariant::Full24 => FULL_LAYOUT,
        }
    }

    pub fn timestamp_style(self) -> TimestampStyle {
        match self {
            TelegramVariant::Compact19 | TelegramVariant::Compact20 => TimestampStyle::Colon,
            TelegramVariant::Full23 | TelegramVariant::Full24 => TimestampStyle::Slash,
        }
    }
}

impl fmt::Display for TelegramVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_count())
    }
}

impl FromStr for TelegramVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(TelegramVariant::from_field_count)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Unknown telegram variant '{}' (expected 19, 20, 23 or 24)",
                    s
                ))
            })
    }
}

// =============================================================================
// Observation Fields
// =============================================================================

/// Tracked observation fields, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationField {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    WindGust,
    WindDirection,
    SolarRadiation,
    DewPoint,
    WindChill,
    RainRate,
}

/// How one observation token maps onto the canonical record
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: ObservationField,
    pub name: &'static str,
    /// Wire value × scale = canonical value
    pub scale: f64,
    pub reject_sentinel: bool,
}

impl FieldRule {
    const fn plain(field: ObservationField, name: &'static str) -> Self {
        Self {
            field,
            name,
            scale: 1.0,
            reject_sentinel: false,
        }
    }

    const fn scaled(field: ObservationField, name: &'static str, scale: f64) -> Self {
        Self {
            field,
            name,
            scale,
            reject_sentinel: false,
        }
    }

    /// Parse a wire token into a canonical value
    pub fn decode(&self, token: &str) -> Option<f64> {
        match parse_float_field(self.name, token, self.reject_sentinel) {
            Ok(value) => Some(round_to(value * self.scale, TELEGRAM_DECIMALS)),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    /// Render a canonical value as a wire token
    pub fn encode(&self, value: Option<f64>) -> String {
        value
            .map(|v| format!("{:.2}", v / self.scale))
            .unwrap_or_default()
    }
}

/// Observation block shared by every variant
pub const OBSERVATION_RULES: [FieldRule; 10] = [
    FieldRule::plain(ObservationField::Temperature, "temperature"),
    FieldRule::plain(ObservationField::Humidity, "humidity"),
    FieldRule {
        field: ObservationField::Pressure,
        name: "pressure",
        scale: 1.0,
        reject_sentinel: true,
    },
    FieldRule::scaled(ObservationField::WindSpeed, "wind_speed", KMH_TO_MS),
    FieldRule::scaled(ObservationField::WindGust, "wind_gust", KMH_TO_MS),
    FieldRule::plain(ObservationField::WindDirection, "wind_direction"),
    FieldRule::plain(ObservationField::SolarRadiation, "solar_radiation"),
    FieldRule::plain(ObservationField::DewPoint, "dew_point"),
    FieldRule::plain(ObservationField::WindChill, "wind_chill"),
    FieldRule::scaled(ObservationField::RainRate, "rain_rate", RAIN_TIP_TO_MM),
];

impl ObservationField {
    pub fn get(self, observation: &StationObservation) -> Option<f64> {
        match self {
            ObservationField::Temperature => observation.temperature,
            ObservationField::Humidity => observation.humidity,
            ObservationField::Pressure => observation.pressure,
            ObservationField::WindSpeed => observation.wind_speed,
            ObservationField::WindGust => observation.wind_gust,
            ObservationField::WindDirection => observation.wind_direction,
            ObservationField::SolarRadiation => observation.solar_radiation,
            ObservationField::DewPoint => observation.dew_point,
            ObservationField::WindChill => observation.wind_chill,
            ObservationField::RainRate => observation.rain_rate,
        }
    }

    pub fn set(self, observation: &mut StationObservation, value: Option<f64>) {
        let slot = match self {
            ObservationField::Temperature => &mut observation.temperature,
            ObservationField::Humidity => &mut observation.humidity,
            ObservationField::Pressure => &mut observation.pressure,
            ObservationField::WindSpeed => &mut observation.wind_speed,
            ObservationField::WindGust => &mut observation.wind_gust,
            ObservationField::WindDirection => &mut observation.wind_direction,
            ObservationField::SolarRadiation => &mut observation.solar_radiation,
            ObservationField::DewPoint => &mut observation.dew_point,
            ObservationField::WindChill => &mut observation.wind_chill,
            ObservationField::RainRate => &mut observation.rain_rate,
        };
        *slot = value;
    }
}

// =============================================================================
// Health Fields
// =============================================================================

/// Health block tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthField {
    BatteryVoltage1,
    /// First battery voltage carrying a trailing `#`
    MarkedBatteryVoltage1,
    BatteryVoltage2,
    Current,
    Barometer1,
    Barometer2,
    CommMode,
    SignalStrength,
    ReferenceTemperature,
    ReferenceHumidity,
    FirmwareMode,
}

pub const FULL_LAYOUT: &[HealthField] = &[
    HealthField::BatteryVoltage1,
    HealthField::BatteryVoltage2,
    HealthField::Current,
    HealthField::Barometer1,
    HealthField::Barometer2,
    HealthField::CommMode,
    HealthField::SignalStrength,
    HealthField::ReferenceTemperature,
    HealthField::ReferenceHumidity,
    HealthField::FirmwareMode,
];

pub const COMPACT_19_LAYOUT: &[HealthField] = &[
    HealthField::MarkedBatteryVoltage1,
    HealthField::BatteryVoltage2,
    HealthField::Current,
    HealthField::Barometer1,
    HealthField::Barometer2,
    HealthField::SignalStrength,
];

pub const COMPACT_20_LAYOUT: &[HealthField] = &[
    HealthField::SignalStrength,
    HealthField::MarkedBatteryVoltage1,
    HealthField::BatteryVoltage2,
    HealthField::Barometer1,
    HealthField::Barometer2,
    HealthField::Current,
];

fn decode_reading(name: &str, token: &str) -> Option<f64> {
    match parse_float_field(name, token, false) {
        Ok(value) => Some(round_to(value, TELEGRAM_DECIMALS)),
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}

fn decode_label(token: &str) -> Option<String> {
    let trimmed = token.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn encode_reading(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

impl HealthField {
    pub fn name(self) -> &'static str {
        match self {
            HealthField::BatteryVoltage1 | HealthField::MarkedBatteryVoltage1 => "battery_voltage_1",
            HealthField::BatteryVoltage2 => "battery_voltage_2",
            HealthField::Current => "current",
            HealthField::Barometer1 => "barometer_1",
            HealthField::Barometer2 => "barometer_2",
            HealthField::CommMode => "comm_mode",
            HealthField::SignalStrength => "signal_strength",
            HealthField::ReferenceTemperature => "reference_temperature",
            HealthField::ReferenceHumidity => "reference_humidity",
            HealthField::FirmwareMode => "firmware_mode",
        }
    }

    /// Parse a wire token into the health record
    pub fn decode_into(self, health: &mut StationHealth, token: &str) {
        let name = self.name();
        match self {
            HealthField::BatteryVoltage1 => health.battery_voltage_1 = decode_reading(name, token),
            HealthField::MarkedBatteryVoltage1 => {
                let stripped = token.trim().trim_end_matches(VOLTAGE_MARKER);
                health.battery_voltage_1 = decode_reading(name, stripped);
            }
            HealthField::BatteryVoltage2 => health.battery_voltage_2 = decode_reading(name, token),
            HealthField::Current => health.current = decode_reading(name, token),
            HealthField::Barometer1 => health.barometer_1 = decode_reading(name, token),
            HealthField::Barometer2 => health.barometer_2 = decode_reading(name, token),
            HealthField::CommMode => health.comm_mode = decode_label(token),
            HealthField::SignalStrength => {
                health.signal_strength = parse_int_field(name, token)
                    .or_else(|e| {
                        // Some modems report signal as a float
                        parse_optional_float(token, false)
                            .filter(|v| v.fract() == 0.0)
                            .map(|v| v as i64)
                            .ok_or(e)
                    })
                    .map_err(|e| debug!("{}", e))
                    .ok();
            }
            HealthField::ReferenceTemperature => {
                health.reference_temperature = decode_reading(name, token)
            }
            HealthField::ReferenceHumidity => {
                health.reference_humidity = decode_reading(name, token)
            }
            HealthField::FirmwareMode => health.firmware_mode = decode_label(token),
        }
    }

    /// Render the health value as a wire token
    pub fn encode(self, health: &StationHealth) -> String {
        match self {
            HealthField::BatteryVoltage1 => encode_reading(health.battery_voltage_1),
            HealthField::MarkedBatteryVoltage1 => {
                format!("{}{}", encode_reading(health.battery_voltage_1), VOLTAGE_MARKER)
            }
            HealthField::BatteryVoltage2 => encode_reading(health.battery_voltage_2),
            HealthField::Current => encode_reading(health.current),
            HealthField::Barometer1 => encode_reading(health.barometer_1),
            HealthField::Barometer2 => encode_reading(health.barometer_2),
            HealthField::CommMode => health.comm_mode.clone().unwrap_or_default(),
            HealthField::SignalStrength => health
                .signal_strength
                .map(|s| s.to_string())
                .unwrap_or_default(),
            HealthField::ReferenceTemperature => encode_reading(health.reference_temperature),
            HealthField::ReferenceHumidity => encode_reading(health.reference_humidity),
            HealthField::FirmwareMode => health.firmware_mode.clone().unwrap_or_default(),
        }
    }
}
