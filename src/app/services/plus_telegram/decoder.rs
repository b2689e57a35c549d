//! Plus-telegram decoding
//!
//! Turns one raw telegram into an observation + health pair. Structural problems
//! (too few tokens, unknown variant, unreadable timestamp) abort the decode; a bad
//! individual field only clears that field.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::debug;

use super::layout::{OBSERVATION_RULES, TelegramVariant};
use super::timestamp::parse_timestamp;
use crate::app::models::{StationHealth, StationObservation};
use crate::app::services::telemetry_quality::{DataStatus, annotate_health, sanitize_timestamp};
use crate::constants::plus_telegram::{
    DELIMITER, ENCODED_SPACE, MIN_FIELDS, PLACEHOLDER_INDEX, PREFIX, TRACKED_FIELDS,
};
use crate::{Error, Result};

/// A decoded plus telegram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedTelegram {
    pub variant: TelegramVariant,
    pub observation: StationObservation,
    pub health: StationHealth,
}

/// Strip the prefix, expand encoded spaces into delimiters and trim
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let unprefixed = trimmed.strip_prefix(PREFIX).unwrap_or(trimmed);
    unprefixed
        .replace(ENCODED_SPACE, &DELIMITER.to_string())
        .trim()
        .to_string()
}

/// Decode a raw telegram relative to the wall-clock time `now`
pub fn decode_plus_telegram(
    raw: &str,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<DecodedTelegram> {
    let normalized = normalize(raw);
    let tokens: Vec<&str> = normalized.split(DELIMITER).collect();

    if tokens.len() < MIN_FIELDS {
        return Err(Error::format(format!(
            "Telegram has {} fields, at least {} required",
            tokens.len(),
            MIN_FIELDS
        )));
    }

    let variant = TelegramVariant::from_field_count(tokens.len()).ok_or_else(|| {
        Error::format(format!(
            "Unsupported telegram length of {} fields (expected 19, 20, 23 or 24)",
            tokens.len()
        ))
    })?;

    // Drop the sequence number
    let fields = &tokens[1..];

    let telegram_ts = parse_timestamp(fields[fields.len() - 2], offset)?;
    let sanitized = sanitize_timestamp(telegram_ts, now);

    let body: Vec<&str> = if variant.has_placeholder() {
        fields[..PLACEHOLDER_INDEX]
            .iter()
            .chain(&fields[PLACEHOLDER_INDEX + 1..])
            .copied()
            .collect()
    } else {
        fields.to_vec()
    };

    let mut observation = StationObservation::empty(sanitized.timestamp);
    let mut flags = Vec::with_capacity(TRACKED_FIELDS);
    for (rule, token) in OBSERVATION_RULES.iter().zip(&body[..TRACKED_FIELDS]) {
        let value = rule.decode(token);
        flags.push(value.is_some());
        rule.field.set(&mut observation, value);
    }

    let mut health = StationHealth::empty(sanitized.timestamp, raw.trim());
    let layout = variant.health_layout();
    for (field, token) in layout
        .iter()
        .zip(&body[TRACKED_FIELDS..TRACKED_FIELDS + layout.len()])
    {
        field.decode_into(&mut health, token);
    }

    let status = DataStatus::from_flags(flags);
    debug!(
        "Decoded {}-field telegram: data status {}",
        variant.field_count(),
        status
    );

    Ok(DecodedTelegram {
        variant,
        observation,
        health: annotate_health(health, &status, &sanitized),
    })
}
