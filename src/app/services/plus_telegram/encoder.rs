//! Plus-telegram encoding
//!
//! The exact inverse of the decoder, used for simulation and round-trip testing.

use chrono::FixedOffset;

use super::layout::{OBSERVATION_RULES, TelegramVariant};
use super::timestamp::format_timestamp;
use crate::app::models::{StationHealth, StationObservation};
use crate::constants::plus_telegram::{DELIMITER, PLACEHOLDER_INDEX, PREFIX, TRAILER};

/// Placeholder written at the reserved position of variants 20 and 24
const PLACEHOLDER: &str = "0";

/// Encode an observation + health pair as a telegram of the given variant
pub fn encode_plus_telegram(
    observation: &StationObservation,
    health: &StationHealth,
    variant: TelegramVariant,
    offset: FixedOffset,
    sequence: u32,
) -> String {
    let mut body: Vec<String> = OBSERVATION_RULES
        .iter()
        .map(|rule| rule.encode(rule.field.get(observation)))
        .collect();

    body.extend(
        variant
            .health_layout()
            .iter()
            .map(|field| field.encode(health)),
    );

    if variant.has_placeholder() {
        body.insert(PLACEHOLDER_INDEX, PLACEHOLDER.to_string());
    }

    let mut tokens = Vec::with_capacity(variant.field_count());
    tokens.push(format!("{:04}", sequence));
    tokens.extend(body);
    tokens.push(format_timestamp(
        observation.timestamp,
        offset,
        variant.timestamp_style(),
    ));
    tokens.push(TRAILER.to_string());

    format!("{}{}", PREFIX, tokens.join(&DELIMITER.to_string()))
}
