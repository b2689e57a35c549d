//! Test fixtures for the ingestion pipeline
//!
//! Builds pipelines over a [`MemoryStore`] and the scripted cloud fetcher, with pacing
//! disabled so cycles run instantly.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::Arc;

use crate::app::adapters::store::MemoryStore;
use crate::app::models::{RawCredentials, SourceKind, StationConfig};
use crate::app::services::cloud_adapter::CloudAdapter;
use crate::app::services::cloud_adapter::tests::{
    DASHBOARD_BASE, ScriptedFetcher, dashboard_body, offset,
};
use crate::app::services::ingestion::IngestionPipeline;
use crate::app::services::plus_telegram::PlusTelegramCodec;
use crate::config::PacingConfig;

mod cycle_tests;
mod telegram_tests;

pub fn pipeline(fetcher: Arc<ScriptedFetcher>, store: Arc<MemoryStore>) -> IngestionPipeline {
    IngestionPipeline::new(
        CloudAdapter::new(fetcher, offset()),
        store,
        PlusTelegramCodec::new(offset()),
        PacingConfig::immediate(),
    )
}

/// Wall clock truncated to whole seconds
pub fn now_secs() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    now_secs() - Duration::minutes(minutes)
}

/// An active dashboard-backed station
pub fn dashboard_station(station_id: i64, uuid: &str) -> StationConfig {
    StationConfig::cloud(
        station_id,
        DASHBOARD_BASE,
        RawCredentials {
            station_uuid: Some(uuid.to_string()),
            ..RawCredentials::default()
        },
    )
}

/// Serve a dashboard body for `uuid` observed at `observed_at`
pub fn serve_dashboard(
    fetcher: ScriptedFetcher,
    uuid: &str,
    observed_at: DateTime<Utc>,
) -> ScriptedFetcher {
    fetcher.with_body(
        format!("{}/{}", DASHBOARD_BASE, uuid),
        dashboard_body(observed_at.timestamp_millis()),
    )
}

pub fn telegram_station(station_id: i64) -> StationConfig {
    StationConfig {
        source: SourceKind::Telegram,
        source_url: None,
        ..StationConfig::cloud(station_id, "", RawCredentials::default())
    }
}
