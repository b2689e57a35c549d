//! Tests for push ingestion and buffered-telegram promotion

use super::*;
use crate::Error;
use crate::app::adapters::store::ObservationStore;
use crate::app::models::{StationStatus, TelegramFormat};
use crate::app::services::comma_telegram::tests::{OBSERVATION_TOKENS, comma_telegram};
use crate::app::services::plus_telegram::TelegramVariant;
use crate::app::services::plus_telegram::tests::{full_health, full_observation};
use tokio_util::sync::CancellationToken;

fn plus_telegram_at(observed_at: DateTime<Utc>) -> String {
    PlusTelegramCodec::new(offset()).encode(
        &full_observation(observed_at),
        &full_health(observed_at),
        TelegramVariant::Full23,
    )
}

fn idle_pipeline(store: Arc<MemoryStore>) -> IngestionPipeline {
    pipeline(Arc::new(ScriptedFetcher::new()), store)
}

#[test]
fn test_plus_telegram_is_buffered_under_supplied_station() {
    let store = Arc::new(MemoryStore::new());
    let observed_at = now_secs();

    idle_pipeline(store.clone())
        .ingest_telegram(&plus_telegram_at(observed_at), TelegramFormat::Plus, Some(42))
        .unwrap();

    let buffered = store.buffered_telegrams().unwrap();
    assert_eq!(buffered.len(), 1);
    assert_eq!(buffered[0].station_id, 42);
    assert_eq!(buffered[0].observation.station_id, Some(42));
    assert_eq!(buffered[0].health.station_id, Some(42));
    assert_eq!(buffered[0].observation.timestamp, observed_at);
    assert_eq!(buffered[0].health.data_count, 10);
}

#[test]
fn test_plus_telegram_requires_station_id() {
    let store = Arc::new(MemoryStore::new());
    let result = idle_pipeline(store.clone()).ingest_telegram(
        &plus_telegram_at(now_secs()),
        TelegramFormat::Plus,
        None,
    );

    assert!(matches!(result, Err(Error::Configuration { .. })));
    assert!(store.buffered_telegrams().unwrap().is_empty());
}

#[test]
fn test_malformed_telegram_is_not_buffered() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = idle_pipeline(store.clone());

    let plus = pipeline.ingest_telegram(">0001+21.5+80+END", TelegramFormat::Plus, Some(1));
    assert!(matches!(plus, Err(Error::Format { .. })));

    let comma = pipeline.ingest_telegram("3107,121.0,14.6", TelegramFormat::Comma, None);
    assert!(matches!(comma, Err(Error::Format { .. })));

    assert!(store.buffered_telegrams().unwrap().is_empty());
}

#[test]
fn test_comma_telegram_keeps_its_own_station_id() {
    let store = Arc::new(MemoryStore::new());
    let raw = comma_telegram(&OBSERVATION_TOKENS, now_secs().timestamp());

    idle_pipeline(store.clone())
        .ingest_telegram(&raw, TelegramFormat::Comma, Some(99))
        .unwrap();

    let buffered = store.buffered_telegrams().unwrap();
    assert_eq!(buffered.len(), 1);
    assert_eq!(buffered[0].station_id, 3107);
    assert_eq!(buffered[0].observation.station_id, Some(3107));
}

#[test]
fn test_promotion_moves_buffer_to_current() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = idle_pipeline(store.clone());

    let fresh_at = minutes_ago(2);
    let stale_at = minutes_ago(180);
    pipeline
        .ingest_telegram(&plus_telegram_at(fresh_at), TelegramFormat::Plus, Some(1))
        .unwrap();
    pipeline
        .ingest_telegram(&plus_telegram_at(stale_at), TelegramFormat::Plus, Some(2))
        .unwrap();

    let report = pipeline.promote_buffered(&CancellationToken::new()).unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.online, 1);
    assert_eq!(report.offline, 1);
    assert_eq!(report.success_rate(), 100.0);

    assert!(store.buffered_telegrams().unwrap().is_empty());
    assert_eq!(
        store.current(1).unwrap().unwrap().observation.timestamp,
        fresh_at
    );
    assert_eq!(store.status(1).unwrap().unwrap().status, StationStatus::Online);

    let stale = store.status(2).unwrap().unwrap();
    assert_eq!(stale.status, StationStatus::Offline);
    assert_eq!(stale.observed_at, stale_at);
}

#[test]
fn test_promotion_with_empty_buffer() {
    let store = Arc::new(MemoryStore::new());
    let report = idle_pipeline(store)
        .promote_buffered(&CancellationToken::new())
        .unwrap();

    assert_eq!(report.attempted, 0);
    assert_eq!(report.success_rate(), 0.0);
}

#[test]
fn test_cancelled_promotion_leaves_buffer_untouched() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = idle_pipeline(store.clone());
    pipeline
        .ingest_telegram(&plus_telegram_at(now_secs()), TelegramFormat::Plus, Some(1))
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = pipeline.promote_buffered(&cancel).unwrap();

    assert_eq!(report.attempted, 0);
    assert_eq!(report.cancelled, 1);
    assert_eq!(store.buffered_telegrams().unwrap().len(), 1);
    assert!(store.current(1).unwrap().is_none());
    assert!(store.status(1).unwrap().is_none());
}

#[test]
fn test_pushed_telegram_records_are_stored() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = idle_pipeline(store.clone());
    let raw = comma_telegram(&OBSERVATION_TOKENS, now_secs().timestamp());

    pipeline
        .ingest_telegram(&raw, TelegramFormat::Comma, None)
        .unwrap();
    pipeline
        .ingest_telegram(&plus_telegram_at(now_secs()), TelegramFormat::Plus, Some(42))
        .unwrap();

    let observations = store.observations().unwrap();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].station_id, Some(3107));
    assert_eq!(observations[1].station_id, Some(42));

    let health = store.health_records().unwrap();
    assert_eq!(health.len(), 2);
    assert_eq!(health[0].station_id, Some(3107));
    assert_eq!(health[0].data_count, 11);
    assert_eq!(health[0].raw_message, raw);
    assert_eq!(health[1].station_id, Some(42));

    // Promotion does not store the records a second time
    pipeline.promote_buffered(&CancellationToken::new()).unwrap();
    assert_eq!(store.observations().unwrap().len(), 2);
    assert_eq!(store.health_records().unwrap().len(), 2);
}

#[test]
fn test_rejected_telegram_stores_nothing() {
    let store = Arc::new(MemoryStore::new());
    let result = idle_pipeline(store.clone()).ingest_telegram(
        "3107,121.0,14.6",
        TelegramFormat::Comma,
        None,
    );

    assert!(result.is_err());
    assert!(store.observations().unwrap().is_empty());
    assert!(store.health_records().unwrap().is_empty());
}
