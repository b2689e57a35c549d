//! Plus-telegram codec for the first hardware vendor
//!
//! The telegram is a `+`-delimited ASCII line in one of four layouts, told apart by
//! token count:
//!
//! | Variant | Placeholder | Health layout | Timestamp |
//! |---------|-------------|---------------|-----------|
//! | 19      | no          | compact-19    | `YY:MM:DD:HH:MM:SS` |
//! | 20      | position 5  | compact-20    | `YY:MM:DD:HH:MM:SS` |
//! | 23      | no          | full          | `YYYY/MM/DD,HH:MM:SS` |
//! | 24      | position 5  | full          | `YYYY/MM/DD,HH:MM:SS` |
//!
//! Every variant is `seq + 10 observation fields + health block + timestamp + trailer`.
//!
//! The codec is organized into:
//! - [`layout`] - Variant detection and the declarative field tables
//! - [`timestamp`] - The two timestamp layouts
//! - [`decoder`] - Raw telegram to observation + health
//! - [`encoder`] - Observation + health back to a raw telegram
//!
//! ## Usage
//!
//! ```rust
//! use station_telemetry::app::services::plus_telegram::PlusTelegramCodec;
//!
//! # fn example() -> station_telemetry::Result<()> {
//! let codec = PlusTelegramCodec::default();
//! let decoded = codec.decode(">0001+21.5+80+1012.3+7.2+10.8+180+450+18.1+21.5+0+12.6#+12.4+0.35+1012.1+1012.4+21+24:03:05:14:30:00+END")?;
//! println!("data status {}", decoded.health.data_status);
//! # Ok(())
//! # }
//! ```

pub mod decoder;
pub mod encoder;
pub mod layout;
pub mod timestamp;

#[cfg(test)]
pub mod tests;

pub use decoder::DecodedTelegram;
pub use layout::TelegramVariant;

use crate::app::models::{StationHealth, StationObservation};
use crate::constants::DEFAULT_UTC_OFFSET_MINUTES;
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Stateless plus-telegram codec bound to a station UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlusTelegramCodec {
    utc_offset: FixedOffset,
}

impl PlusTelegramCodec {
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self { utc_offset }
    }

    /// Create a codec from an offset in minutes east of UTC
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        FixedOffset::east_opt(minutes * 60)
            .map(Self::new)
            .ok_or_else(|| Error::configuration(format!("Invalid UTC offset: {} minutes", minutes)))
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Decode against the current wall clock
    pub fn decode(&self, raw: &str) -> Result<DecodedTelegram> {
        self.decode_at(raw, Utc::now())
    }

    /// Decode against a caller-supplied wall clock
    pub fn decode_at(&self, raw: &str, now: DateTime<Utc>) -> Result<DecodedTelegram> {
        decoder::decode_plus_telegram(raw, self.utc_offset, now)
    }

    pub fn encode(
        &self,
        observation: &StationObservation,
        health: &StationHealth,
        variant: TelegramVariant,
    ) -> String {
        self.encode_with_sequence(observation, health, variant, 0)
    }

    pub fn encode_with_sequence(
        &self,
        observation: &StationObservation,
        health: &StationHealth,
        variant: TelegramVariant,
        sequence: u32,
    ) -> String {
        encoder::encode_plus_telegram(observation, health, variant, self.utc_offset, sequence)
    }
}

impl Default for PlusTelegramCodec {
    fn default() -> Self {
        let offset =
            FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).unwrap_or(Utc.fix());
        Self::new(offset)
    }
}
