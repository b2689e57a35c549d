//! `decode`: one raw telegram in, JSON records out

use chrono::{DateTime, Utc};
use tracing::info;

use crate::app::models::TelegramFormat;
use crate::app::services::comma_telegram::CommaTelegramDecoder;
use crate::app::services::plus_telegram::PlusTelegramCodec;
use crate::cli::args::DecodeArgs;
use crate::constants::DEFAULT_UTC_OFFSET_MINUTES;
use crate::{Error, Result};

pub fn run_decode(args: DecodeArgs) -> Result<()> {
    let value = decode_to_json(&args, Utc::now())?;
    let rendered = if args.compact {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    }
    .map_err(|e| Error::decode("decoded telegram output", e))?;

    println!("{}", rendered);
    Ok(())
}

/// Decode `args.telegram` relative to `now` and render the records as JSON
pub fn decode_to_json(args: &DecodeArgs, now: DateTime<Utc>) -> Result<serde_json::Value> {
    let value = match TelegramFormat::from(args.format) {
        TelegramFormat::Plus => {
            let codec = PlusTelegramCodec::from_offset_minutes(
                args.utc_offset_minutes
                    .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES),
            )?;
            let mut decoded = codec.decode_at(&args.telegram, now)?;
            if let Some(station_id) = args.station_id {
                decoded.observation = decoded.observation.with_station_id(station_id);
                decoded.health = decoded.health.with_station_id(station_id);
            }
            info!(
                "Decoded {}-field plus telegram ({} fields present)",
                decoded.variant, decoded.health.data_count
            );
            serde_json::to_value(&decoded)
        }
        TelegramFormat::Comma => {
            let decoded = CommaTelegramDecoder::new().decode_at(&args.telegram, now)?;
            info!(
                "Decoded comma telegram for station {} ({} fields present)",
                decoded.station_id, decoded.health.data_count
            );
            serde_json::to_value(&decoded)
        }
    };
    value.map_err(|e| Error::decode("decoded telegram output", e))
}
