//! Persistence collaborator
//!
//! The pipeline only talks to [`ObservationStore`]. [`MemoryStore`] backs the CLI and
//! the tests; a database-backed store implements the same trait elsewhere.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::app::models::{BufferedTelegram, StationHealth, StationObservation, StationStatus};
use crate::{Error, Result};

/// Storage operations the ingestion pipeline needs
///
/// Records are passed by value; the store owns them from then on.
pub trait ObservationStore: Send + Sync {
    fn insert_observation(&self, observation: StationObservation) -> Result<()>;

    fn insert_health(&self, health: StationHealth) -> Result<()>;

    fn update_station_status(
        &self,
        station_id: i64,
        status: StationStatus,
        observed_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Telegrams pushed by stations and not yet promoted
    fn buffered_telegrams(&self) -> Result<Vec<BufferedTelegram>>;

    /// Make a buffered telegram the station's current reading
    fn promote_current(&self, telegram: BufferedTelegram) -> Result<()>;

    fn buffer_telegram(&self, telegram: BufferedTelegram) -> Result<()>;
}

/// Last known status of a station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: StationStatus,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    observations: Vec<StationObservation>,
    health: Vec<StationHealth>,
    statuses: HashMap<i64, StatusRecord>,
    buffered: Vec<BufferedTelegram>,
    current: HashMap<i64, BufferedTelegram>,
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::persistence("memory store lock poisoned"))
    }

    pub fn observations(&self) -> Result<Vec<StationObservation>> {
        Ok(self.lock()?.observations.clone())
    }

    pub fn health_records(&self) -> Result<Vec<StationHealth>> {
        Ok(self.lock()?.health.clone())
    }

    pub fn status(&self, station_id: i64) -> Result<Option<StatusRecord>> {
        Ok(self.lock()?.statuses.get(&station_id).copied())
    }

    pub fn current(&self, station_id: i64) -> Result<Option<BufferedTelegram>> {
        Ok(self.lock()?.current.get(&station_id).cloned())
    }
}

impl ObservationStore for MemoryStore {
    fn insert_observation(&self, observation: StationObservation) -> Result<()> {
        self.lock()?.observations.push(observation);
        Ok(())
    }

    fn insert_health(&self, health: StationHealth) -> Result<()> {
        self.lock()?.health.push(health);
        Ok(())
    }

    fn update_station_status(
        &self,
        station_id: i64,
        status: StationStatus,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        debug!("Station {} is {}", station_id, status);
        self.lock()?.statuses.insert(
            station_id,
            StatusRecord {
                status,
                observed_at,
            },
        );
        Ok(())
    }

    fn buffered_telegrams(&self) -> Result<Vec<BufferedTelegram>> {
        Ok(self.lock()?.buffered.clone())
    }

    fn promote_current(&self, telegram: BufferedTelegram) -> Result<()> {
        let mut state = self.lock()?;
        state.buffered.retain(|b| {
            !(b.station_id == telegram.station_id
                && b.observation.timestamp == telegram.observation.timestamp)
        });
        state.current.insert(telegram.station_id, telegram);
        Ok(())
    }

    fn buffer_telegram(&self, telegram: BufferedTelegram) -> Result<()> {
        self.lock()?.buffered.push(telegram);
        Ok(())
    }
}
