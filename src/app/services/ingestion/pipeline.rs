//! Polling cycle, buffered-telegram promotion and push ingestion

use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::stats::CycleReport;
use crate::app::adapters::store::ObservationStore;
use crate::app::models::{BufferedTelegram, StationConfig, StationStatus, TelegramFormat};
use crate::app::services::cloud_adapter::{CloudAdapter, CloudCredentials, is_usable_url};
use crate::app::services::comma_telegram::CommaTelegramDecoder;
use crate::app::services::plus_telegram::PlusTelegramCodec;
use crate::config::PacingConfig;
use crate::{Error, Result};

/// ONLINE when `timestamp` lies within the last hour of `now`
pub fn derive_status(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> StationStatus {
    StationStatus::derive(timestamp, now)
}

/// Why a configured station is not polled
fn eligibility(station: &StationConfig) -> std::result::Result<(&str, CloudCredentials), String> {
    if !station.active {
        return Err("inactive".to_string());
    }
    if !station.is_cloud() {
        return Err("not cloud-backed".to_string());
    }
    let url = station
        .source_url
        .as_deref()
        .filter(|url| is_usable_url(url))
        .ok_or_else(|| "no usable source URL".to_string())?;
    let credentials = CloudCredentials::resolve(&station.credentials).map_err(|e| e.to_string())?;
    Ok((url.trim(), credentials))
}

/// Drives the cloud adapter and the telegram codecs into an [`ObservationStore`]
pub struct IngestionPipeline {
    adapter: CloudAdapter,
    store: Arc<dyn ObservationStore>,
    plus_codec: PlusTelegramCodec,
    comma_decoder: CommaTelegramDecoder,
    pacing: PacingConfig,
}

impl IngestionPipeline {
    pub fn new(
        adapter: CloudAdapter,
        store: Arc<dyn ObservationStore>,
        plus_codec: PlusTelegramCodec,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            adapter,
            store,
            plus_codec,
            comma_decoder: CommaTelegramDecoder::new(),
            pacing,
        }
    }

    fn station_delay(&self) -> Duration {
        let min = self.pacing.min_station_delay_ms;
        let max = self.pacing.max_station_delay_ms;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// Poll every eligible cloud station once
    ///
    /// Failures are isolated per station. Once `cancel` fires no further station is
    /// fetched or persisted.
    pub async fn run_cycle(
        &self,
        stations: &[StationConfig],
        cancel: &CancellationToken,
    ) -> CycleReport {
        let mut report = CycleReport::new();

        let mut eligible = Vec::new();
        for station in stations {
            match eligibility(station) {
                Ok((url, credentials)) => eligible.push((station, url, credentials)),
                Err(reason) => {
                    debug!("Station {} not polled: {}", station.station_id, reason);
                    report.ineligible += 1;
                }
            }
        }
        info!(
            "Polling {} of {} configured stations",
            eligible.len(),
            stations.len()
        );

        let total = eligible.len();
        for (index, (station, url, credentials)) in eligible.into_iter().enumerate() {
            let delay = self.station_delay();
            let proceed = tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            };
            if !proceed {
                report.cancelled += total - index;
                break;
            }

            report.attempted += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::cancelled("cycle cancelled during fetch")),
                result = self.poll_station(station, url, &credentials, cancel) => result,
            };

            match result {
                Ok(status) => report.record_success(status),
                Err(Error::Cancelled { .. }) => {
                    report.attempted -= 1;
                    report.cancelled += total - index;
                    break;
                }
                Err(e) => {
                    warn!("Station {} failed: {}", station.station_id, e);
                    report.record_failure(station.station_id, e);
                }
            }
        }

        if report.was_cancelled() {
            warn!("Polling cycle cancelled; {} stations skipped", report.cancelled);
        }
        info!(
            "Polling cycle: {} succeeded, {} failed, {} ineligible ({:.1}% success)",
            report.succeeded,
            report.failed,
            report.ineligible,
            report.success_rate()
        );
        report
    }

    async fn poll_station(
        &self,
        station: &StationConfig,
        url: &str,
        credentials: &CloudCredentials,
        cancel: &CancellationToken,
    ) -> Result<StationStatus> {
        let outcome = self.adapter.fetch(credentials, url).await?;
        for failure in &outcome.failures {
            debug!(
                "Station {}: upstream station {} failed: {}",
                station.station_id, failure.remote_station_id, failure.message
            );
        }

        let reading = outcome
            .select_reading(station.remote_station_id.as_deref())
            .ok_or_else(|| {
                Error::missing_field(
                    format!("cloud response for station {}", station.station_id),
                    "reading",
                )
            })?;

        if cancel.is_cancelled() {
            return Err(Error::cancelled("cycle cancelled before persisting"));
        }

        let observation = reading.observation.with_station_id(station.station_id);
        let observed_at = observation.timestamp;
        self.store.insert_observation(observation)?;

        let status = derive_status(observed_at, Utc::now());
        self.store
            .update_station_status(station.station_id, status, observed_at)?;
        debug!("Station {} polled: {}", station.station_id, status);
        Ok(status)
    }

    /// Promote every buffered telegram to current and refresh station status
    pub fn promote_buffered(&self, cancel: &CancellationToken) -> Result<CycleReport> {
        let buffered = self.store.buffered_telegrams()?;
        let total = buffered.len();
        let mut report = CycleReport::new();

        for (index, telegram) in buffered.into_iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled += total - index;
                break;
            }

            report.attempted += 1;
            let station_id = telegram.station_id;
            match self.promote_one(telegram) {
                Ok(status) => report.record_success(status),
                Err(e) => {
                    warn!("Promotion for station {} failed: {}", station_id, e);
                    report.record_failure(station_id, e);
                }
            }
        }

        info!(
            "Promoted {} of {} buffered telegrams",
            report.succeeded, total
        );
        Ok(report)
    }

    fn promote_one(&self, telegram: BufferedTelegram) -> Result<StationStatus> {
        let station_id = telegram.station_id;
        let observed_at = telegram.observation.timestamp;
        self.store.promote_current(telegram)?;

        let status = derive_status(observed_at, Utc::now());
        self.store
            .update_station_status(station_id, status, observed_at)?;
        Ok(status)
    }

    /// Decode a pushed telegram, store its records and buffer it for promotion
    ///
    /// Plus telegrams do not carry a station id, so one must be supplied. Comma
    /// telegrams carry their own, which wins over a supplied one.
    pub fn ingest_telegram(
        &self,
        raw: &str,
        format: TelegramFormat,
        station_id: Option<i64>,
    ) -> Result<()> {
        let telegram = match format {
            TelegramFormat::Plus => {
                let station_id = station_id.ok_or_else(|| {
                    Error::configuration("A station id is required for plus telegrams")
                })?;
                let decoded = self.plus_codec.decode(raw)?;
                BufferedTelegram {
                    station_id,
                    observation: decoded.observation.with_station_id(station_id),
                    health: decoded.health.with_station_id(station_id),
                }
            }
            TelegramFormat::Comma => {
                let decoded = self.comma_decoder.decode(raw)?;
                if let Some(supplied) = station_id.filter(|id| *id != decoded.station_id) {
                    warn!(
                        "Supplied station id {} differs from telegram station id {}",
                        supplied, decoded.station_id
                    );
                }
                BufferedTelegram {
                    station_id: decoded.station_id,
                    observation: decoded.observation,
                    health: decoded.health,
                }
            }
        };

        if telegram.health.has_anomaly() {
            warn!(
                "Station {} telegram flagged: {}",
                telegram.station_id,
                telegram.health.error_msg.as_deref().unwrap_or_default()
            );
        }
        debug!(
            "Buffering telegram for station {} ({} fields present)",
            telegram.station_id, telegram.health.data_count
        );
        self.store.insert_observation(telegram.observation.clone())?;
        self.store.insert_health(telegram.health.clone())?;
        self.store.buffer_telegram(telegram)
    }
}
