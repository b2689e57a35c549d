//! `poll`: cloud polling cycles against an in-memory store

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::shared::print_cycle_summary;
use crate::app::adapters::directory::{StaticDirectory, StationDirectory};
use crate::app::adapters::store::MemoryStore;
use crate::app::services::cloud_adapter::{CloudAdapter, ReqwestFetcher};
use crate::app::services::ingestion::{CycleReport, IngestionPipeline};
use crate::app::services::plus_telegram::PlusTelegramCodec;
use crate::cli::args::PollArgs;
use crate::config::{Config, PacingConfig};
use crate::Result;

pub async fn run_poll(args: PollArgs, cancel: CancellationToken) -> Result<()> {
    args.validate()?;
    let config = effective_config(&args, Config::load_layered(args.config_file.as_deref())?)?;
    debug!("Loaded configuration: {:?}", config);

    let offset = config.utc_offset()?;
    let fetcher = Arc::new(ReqwestFetcher::new(&config.http)?);
    let store = Arc::new(MemoryStore::new());
    let directory = StaticDirectory::new(config.stations.clone());
    let pipeline = IngestionPipeline::new(
        CloudAdapter::new(fetcher, offset),
        store,
        PlusTelegramCodec::new(offset),
        config.pacing,
    );

    let interval = Duration::from_secs(args.interval_secs);
    let mut cycle = 1usize;
    loop {
        info!("Starting polling cycle {}", cycle);
        let report = poll_once(&pipeline, &directory, &cancel).await?;
        print_cycle_summary(&format!("Polling cycle {} complete", cycle), &report);

        if args.once || cancel.is_cancelled() {
            break;
        }

        let keep_going = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(interval) => true,
        };
        if !keep_going {
            break;
        }
        cycle += 1;
    }

    Ok(())
}

/// Apply the command-line overrides on top of the layered configuration
pub fn effective_config(args: &PollArgs, config: Config) -> Result<Config> {
    let mut config = config;
    if let Some(timeout_secs) = args.timeout_secs {
        config = config.with_timeout_secs(timeout_secs);
    }
    if args.no_pacing {
        config = config.with_pacing(PacingConfig::immediate());
    }
    config.validate()?;
    Ok(config)
}

/// One cloud cycle followed by promotion of whatever was pushed meanwhile
pub async fn poll_once(
    pipeline: &IngestionPipeline,
    directory: &dyn StationDirectory,
    cancel: &CancellationToken,
) -> Result<CycleReport> {
    let stations = directory.stations()?;
    let mut report = pipeline.run_cycle(&stations, cancel).await;
    report.merge(pipeline.promote_buffered(cancel)?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{RawCredentials, StationConfig, TelegramFormat};
    use crate::app::services::cloud_adapter::tests::{
        DASHBOARD_BASE, ScriptedFetcher, dashboard_body, offset,
    };
    use crate::app::services::comma_telegram::tests::{OBSERVATION_TOKENS, comma_telegram};
    use chrono::Utc;

    fn args() -> PollArgs {
        PollArgs {
            config_file: None,
            once: true,
            interval_secs: 300,
            timeout_secs: None,
            no_pacing: false,
        }
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = effective_config(
            &PollArgs {
                timeout_secs: Some(3),
                no_pacing: true,
                ..args()
            },
            Config::default(),
        )
        .unwrap();

        assert_eq!(config.http.timeout_secs, 3);
        assert_eq!(config.pacing, PacingConfig::immediate());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = effective_config(
            &PollArgs {
                timeout_secs: Some(0),
                ..args()
            },
            Config::default(),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_poll_once_covers_cloud_and_pushed_stations() {
        let now = Utc::now();
        let fetcher = Arc::new(ScriptedFetcher::new().with_body(
            format!("{}/uuid-1", DASHBOARD_BASE),
            dashboard_body(now.timestamp_millis()),
        ));
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(
            CloudAdapter::new(fetcher, offset()),
            store.clone(),
            PlusTelegramCodec::new(offset()),
            PacingConfig::immediate(),
        );
        pipeline
            .ingest_telegram(
                &comma_telegram(&OBSERVATION_TOKENS, now.timestamp()),
                TelegramFormat::Comma,
                None,
            )
            .unwrap();

        let directory = StaticDirectory::new(vec![StationConfig::cloud(
            1,
            DASHBOARD_BASE,
            RawCredentials {
                station_uuid: Some("uuid-1".to_string()),
                ..RawCredentials::default()
            },
        )]);

        let report = poll_once(&pipeline, &directory, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.online, 2);
        assert!(store.status(1).unwrap().is_some());
        assert!(store.status(3107).unwrap().is_some());
    }
}
