//! Cloud vendor adapter
//!
//! Normalizes three generations of the vendor's HTTP API into [`StationObservation`]s:
//!
//! - [`keyed_api`] - v2, api key + secret, many stations per call
//! - [`token_api`] - v1, user + password + token, one station
//! - [`dashboard`] - public dashboard scrape by station uuid
//!
//! The generation is picked by the [`CloudCredentials`] variant, which is resolved once
//! from configuration. All network access goes through an [`HttpFetcher`].

pub mod client;
pub mod credentials;
pub mod dashboard;
pub mod json_value;
pub mod keyed_api;
pub mod local_time;
pub mod token_api;

#[cfg(test)]
pub mod tests;

pub use client::{FetchRequest, HttpFetcher, ReqwestFetcher};
pub use credentials::CloudCredentials;

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::Result;
use crate::app::models::StationObservation;

/// One normalized reading with the upstream identifier it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CloudReading {
    pub remote_station_id: Option<String>,
    pub observation: StationObservation,
}

/// A station that failed inside an otherwise successful call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationFailure {
    pub remote_station_id: String,
    pub message: String,
}

/// Everything one adapter call produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub readings: Vec<CloudReading>,
    pub failures: Vec<StationFailure>,
    /// Stations dropped for missing required fields
    pub skipped: usize,
}

impl FetchOutcome {
    /// The reading for `remote_station_id`, or the first one when no id is given
    /// or nothing matches
    pub fn select_reading(self, remote_station_id: Option<&str>) -> Option<CloudReading> {
        let index = remote_station_id
            .and_then(|id| {
                self.readings
                    .iter()
                    .position(|r| r.remote_station_id.as_deref() == Some(id))
            })
            .unwrap_or(0);
        self.readings.into_iter().nth(index)
    }
}

/// Whether `url` is an absolute http(s) URL with a host
pub fn is_usable_url(url: &str) -> bool {
    reqwest::Url::parse(url.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Stateless adapter over an [`HttpFetcher`]
#[derive(Clone)]
pub struct CloudAdapter {
    fetcher: Arc<dyn HttpFetcher>,
    utc_offset: FixedOffset,
}

impl CloudAdapter {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, utc_offset: FixedOffset) -> Self {
        Self {
            fetcher,
            utc_offset,
        }
    }

    /// Fetch the readings behind `credentials` from `source_url`
    pub async fn fetch(
        &self,
        credentials: &CloudCredentials,
        source_url: &str,
    ) -> Result<FetchOutcome> {
        self.fetch_at(credentials, source_url, Utc::now()).await
    }

    /// Fetch with a caller-supplied wall clock for date-less upstream times
    #[instrument(skip(self, credentials, now), fields(kind = credentials.kind()))]
    pub async fn fetch_at(
        &self,
        credentials: &CloudCredentials,
        source_url: &str,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome> {
        let fetcher = self.fetcher.as_ref();
        let outcome = match credentials {
            CloudCredentials::Keyed {
                api_key,
                api_secret,
            } => keyed_api::fetch_keyed(fetcher, source_url, api_key, api_secret).await?,
            CloudCredentials::Token {
                user,
                password,
                token,
            } => {
                token_api::fetch_token(
                    fetcher,
                    source_url,
                    user,
                    password,
                    token,
                    self.utc_offset,
                    now,
                )
                .await?
            }
            CloudCredentials::Dashboard { station_uuid } => {
                dashboard::fetch_dashboard(fetcher, source_url, station_uuid, self.utc_offset, now)
                    .await?
            }
        };

        info!(
            readings = outcome.readings.len(),
            failures = outcome.failures.len(),
            skipped = outcome.skipped,
            "Cloud fetch complete"
        );
        Ok(outcome)
    }
}
