//! Comma-telegram decoder for the second hardware vendor
//!
//! Decode-only. The telegram carries its own station id and coordinates, so the
//! decoded records come back with the station id already attached.

pub mod decoder;

#[cfg(test)]
pub mod tests;

pub use decoder::{CommaTelegram, decode_comma_telegram};

use crate::Result;
use chrono::{DateTime, Utc};

/// Stateless comma-telegram decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommaTelegramDecoder;

impl CommaTelegramDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode against the current wall clock
    pub fn decode(&self, raw: &str) -> Result<CommaTelegram> {
        self.decode_at(raw, Utc::now())
    }

    pub fn decode_at(&self, raw: &str, now: DateTime<Utc>) -> Result<CommaTelegram> {
        decode_comma_telegram(raw, now)
    }
}
