//! `simulate`: synthetic plus telegrams with plausible readings
//!
//! Useful for exercising a receiver end to end without station hardware.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::Rng;
use tracing::debug;

use crate::app::models::{StationHealth, StationObservation};
use crate::app::services::plus_telegram::{PlusTelegramCodec, TelegramVariant};
use crate::cli::args::SimulateArgs;
use crate::Result;
use crate::constants::{DEFAULT_UTC_OFFSET_MINUTES, RAIN_TIP_TO_MM};

/// Minutes between consecutive simulated telegrams
const SIMULATED_INTERVAL_MINUTES: i64 = 10;

pub fn run_simulate(args: SimulateArgs) -> Result<()> {
    args.validate()?;
    let variant = args.telegram_variant()?;
    let codec = PlusTelegramCodec::from_offset_minutes(
        args.utc_offset_minutes
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES),
    )?;

    let mut rng = rand::thread_rng();
    for telegram in simulate_telegrams(&codec, variant, args.count, Utc::now(), &mut rng) {
        println!("{}", telegram);
    }
    Ok(())
}

/// `count` telegrams ending at `end`, spaced ten minutes apart, oldest first
pub fn simulate_telegrams<R: Rng>(
    codec: &PlusTelegramCodec,
    variant: TelegramVariant,
    count: usize,
    end: DateTime<Utc>,
    rng: &mut R,
) -> Vec<String> {
    let end = end.trunc_subsecs(0);
    (0..count)
        .map(|index| {
            let steps_back = (count - 1 - index) as i64;
            let timestamp = end - Duration::minutes(SIMULATED_INTERVAL_MINUTES * steps_back);
            let observation = plausible_observation(timestamp, rng);
            let health = plausible_health(timestamp, rng);
            let sequence = (index % 10_000) as u32;
            debug!("Simulated telegram {} at {}", sequence, timestamp);
            codec.encode_with_sequence(&observation, &health, variant, sequence)
        })
        .collect()
}

fn rounded<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    (rng.gen_range(min..max) * 10.0).round() / 10.0
}

/// A tropical-lowland reading; every tracked field populated
pub fn plausible_observation<R: Rng>(timestamp: DateTime<Utc>, rng: &mut R) -> StationObservation {
    let temperature = rounded(rng, 22.0, 34.0);
    let wind_speed = rounded(rng, 0.0, 12.0);
    let tips = rng.gen_range(0..=20) as f64;
    StationObservation {
        temperature: Some(temperature),
        humidity: Some(rng.gen_range(45..=100) as f64),
        pressure: Some(rounded(rng, 1000.0, 1016.0)),
        wind_speed: Some(wind_speed),
        wind_gust: Some(wind_speed + rounded(rng, 0.0, 6.0)),
        wind_direction: Some(rng.gen_range(0..360) as f64),
        solar_radiation: Some(rng.gen_range(0..=1100) as f64),
        dew_point: Some(temperature - rounded(rng, 1.0, 9.0)),
        wind_chill: Some(temperature),
        rain_rate: Some(tips * RAIN_TIP_TO_MM),
        ..StationObservation::empty(timestamp)
    }
}

pub fn plausible_health<R: Rng>(timestamp: DateTime<Utc>, rng: &mut R) -> StationHealth {
    let barometer = rounded(rng, 1000.0, 1016.0);
    StationHealth {
        battery_voltage_1: Some(rounded(rng, 12.0, 13.8)),
        battery_voltage_2: Some(rounded(rng, 12.0, 13.8)),
        current: Some((rng.gen_range(0.1..0.9f64) * 100.0).round() / 100.0),
        barometer_1: Some(barometer),
        barometer_2: Some(barometer + 0.2),
        comm_mode: Some("GSM".to_string()),
        signal_strength: Some(rng.gen_range(5..=31)),
        reference_temperature: Some(rounded(rng, 25.0, 40.0)),
        reference_humidity: Some(rounded(rng, 30.0, 70.0)),
        firmware_mode: Some("NORMAL".to_string()),
        ..StationHealth::empty(timestamp, "")
    }
}
