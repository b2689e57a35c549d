//! Tests for cloud polling cycles

use super::*;
use crate::app::models::StationStatus;
use crate::app::services::cloud_adapter::tests::{KEYED_BASE, keyed_current, keyed_listing};
use tokio_util::sync::CancellationToken;

fn keyed_station(station_id: i64, remote_station_id: Option<&str>) -> StationConfig {
    StationConfig {
        remote_station_id: remote_station_id.map(str::to_string),
        ..StationConfig::cloud(
            station_id,
            KEYED_BASE,
            RawCredentials {
                api_key: Some("k".to_string()),
                api_secret: Some("s".to_string()),
                ..RawCredentials::default()
            },
        )
    }
}

#[tokio::test]
async fn test_ineligible_stations_are_never_fetched() {
    let fetcher = Arc::new(serve_dashboard(ScriptedFetcher::new(), "good", now_secs()));
    let store = Arc::new(MemoryStore::new());

    let inactive = StationConfig {
        active: false,
        ..dashboard_station(1, "good")
    };
    let bad_url = StationConfig {
        source_url: Some("ftp://cloud.test/summary".to_string()),
        ..dashboard_station(2, "good")
    };
    let no_url = StationConfig {
        source_url: None,
        ..dashboard_station(3, "good")
    };
    let no_credentials = StationConfig::cloud(4, DASHBOARD_BASE, RawCredentials::default());
    let partial_credentials = StationConfig::cloud(
        5,
        DASHBOARD_BASE,
        RawCredentials {
            api_key: Some("k".to_string()),
            ..RawCredentials::default()
        },
    );
    let stations = vec![
        inactive,
        telegram_station(6),
        bad_url,
        no_url,
        no_credentials,
        partial_credentials,
        dashboard_station(7, "good"),
    ];

    let report = pipeline(fetcher.clone(), store.clone())
        .run_cycle(&stations, &CancellationToken::new())
        .await;

    assert_eq!(report.ineligible, 6);
    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(fetcher.request_count(), 1);

    let observations = store.observations().unwrap();
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].station_id, Some(7));
}

#[tokio::test]
async fn test_station_failure_is_isolated() {
    let fetcher = ScriptedFetcher::new()
        .with_status(format!("{}/{}", DASHBOARD_BASE, "broken"), 500);
    let fetcher = serve_dashboard(fetcher, "first", now_secs());
    let fetcher = Arc::new(serve_dashboard(fetcher, "last", now_secs()));
    let store = Arc::new(MemoryStore::new());

    let stations = vec![
        dashboard_station(1, "first"),
        dashboard_station(2, "broken"),
        dashboard_station(3, "last"),
    ];
    let report = pipeline(fetcher, store.clone())
        .run_cycle(&stations, &CancellationToken::new())
        .await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("station 2:"));
    assert!(!report.was_cancelled());

    assert!(store.status(1).unwrap().is_some());
    assert!(store.status(2).unwrap().is_none());
    assert!(store.status(3).unwrap().is_some());
}

#[tokio::test]
async fn test_status_follows_observation_age() {
    let fresh_at = minutes_ago(5);
    let stale_at = minutes_ago(120);
    let fetcher = serve_dashboard(ScriptedFetcher::new(), "fresh", fresh_at);
    let fetcher = Arc::new(serve_dashboard(fetcher, "stale", stale_at));
    let store = Arc::new(MemoryStore::new());

    let stations = vec![dashboard_station(1, "fresh"), dashboard_station(2, "stale")];
    let report = pipeline(fetcher, store.clone())
        .run_cycle(&stations, &CancellationToken::new())
        .await;

    assert_eq!(report.online, 1);
    assert_eq!(report.offline, 1);

    let fresh = store.status(1).unwrap().unwrap();
    assert_eq!(fresh.status, StationStatus::Online);
    assert_eq!(fresh.observed_at, fresh_at);

    let stale = store.status(2).unwrap().unwrap();
    assert_eq!(stale.status, StationStatus::Offline);
    assert_eq!(stale.observed_at, stale_at);
}

#[tokio::test]
async fn test_remote_station_id_picks_the_reading() {
    let first_ts = minutes_ago(10).timestamp();
    let second_ts = minutes_ago(3).timestamp();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .with_body(format!("{}/stations", KEYED_BASE), keyed_listing(&[1001, 1002]))
            .with_body(format!("{}/current/1001", KEYED_BASE), keyed_current(1001, first_ts))
            .with_body(format!("{}/current/1002", KEYED_BASE), keyed_current(1002, second_ts)),
    );
    let store = Arc::new(MemoryStore::new());

    let stations = vec![keyed_station(21, Some("1002")), keyed_station(22, None)];
    let report = pipeline(fetcher, store.clone())
        .run_cycle(&stations, &CancellationToken::new())
        .await;
    assert_eq!(report.succeeded, 2);

    let observations = store.observations().unwrap();
    let selected = observations.iter().find(|o| o.station_id == Some(21)).unwrap();
    assert_eq!(selected.timestamp.timestamp(), second_ts);

    // Without a remote id the first reading is used
    let defaulted = observations.iter().find(|o| o.station_id == Some(22)).unwrap();
    assert_eq!(defaulted.timestamp.timestamp(), first_ts);
}

#[tokio::test]
async fn test_unmatched_remote_station_id_falls_back_to_first() {
    let ts = minutes_ago(1).timestamp();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .with_body(format!("{}/stations", KEYED_BASE), keyed_listing(&[1001]))
            .with_body(format!("{}/current/1001", KEYED_BASE), keyed_current(1001, ts)),
    );
    let store = Arc::new(MemoryStore::new());

    let report = pipeline(fetcher, store.clone())
        .run_cycle(&[keyed_station(21, Some("9999"))], &CancellationToken::new())
        .await;

    assert_eq!(report.succeeded, 1);
    let observations = store.observations().unwrap();
    assert_eq!(observations[0].timestamp.timestamp(), ts);
}

#[tokio::test]
async fn test_listing_without_readings_fails_the_station() {
    let fetcher = Arc::new(
        ScriptedFetcher::new().with_body(format!("{}/stations", KEYED_BASE), keyed_listing(&[])),
    );
    let store = Arc::new(MemoryStore::new());

    let report = pipeline(fetcher, store.clone())
        .run_cycle(&[keyed_station(21, None)], &CancellationToken::new())
        .await;

    assert_eq!(report.failed, 1);
    assert!(store.observations().unwrap().is_empty());
    assert!(store.status(21).unwrap().is_none());
}

#[tokio::test]
async fn test_cancelled_cycle_persists_nothing() {
    let fetcher = serve_dashboard(ScriptedFetcher::new(), "a", now_secs());
    let fetcher = Arc::new(serve_dashboard(fetcher, "b", now_secs()));
    let store = Arc::new(MemoryStore::new());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let stations = vec![
        dashboard_station(1, "a"),
        dashboard_station(2, "b"),
        telegram_station(3),
    ];
    let report = pipeline(fetcher.clone(), store.clone())
        .run_cycle(&stations, &cancel)
        .await;

    assert_eq!(report.attempted, 0);
    assert_eq!(report.cancelled, 2);
    assert_eq!(report.ineligible, 1);
    assert!(report.was_cancelled());
    assert_eq!(fetcher.request_count(), 0);
    assert!(store.observations().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_station_list() {
    let store = Arc::new(MemoryStore::new());
    let report = pipeline(Arc::new(ScriptedFetcher::new()), store)
        .run_cycle(&[], &CancellationToken::new())
        .await;

    assert_eq!(report.attempted, 0);
    assert_eq!(report.success_rate(), 0.0);
}

#[test]
fn test_report_merge_and_success_rate() {
    use crate::app::services::ingestion::CycleReport;

    let mut polled = CycleReport::new();
    polled.attempted = 4;
    polled.record_success(StationStatus::Online);
    polled.record_success(StationStatus::Online);
    polled.record_success(StationStatus::Offline);
    polled.record_failure(9, "HTTP 503");
    assert_eq!(polled.success_rate(), 75.0);

    let mut promoted = CycleReport::new();
    promoted.attempted = 1;
    promoted.record_success(StationStatus::Offline);

    polled.merge(promoted);
    assert_eq!(polled.attempted, 5);
    assert_eq!(polled.succeeded, 4);
    assert_eq!(polled.online, 2);
    assert_eq!(polled.offline, 2);
    assert_eq!(polled.errors, vec!["station 9: HTTP 503".to_string()]);
}
