//! Cycle statistics for polling and promotion runs

use serde::{Deserialize, Serialize};

use crate::app::models::StationStatus;

/// Outcome of one polling or promotion cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Stations (or buffered telegrams) processing was started for
    pub attempted: usize,

    /// Processed and persisted
    pub succeeded: usize,

    /// Started but failed
    pub failed: usize,

    /// Filtered out before any call was made
    pub ineligible: usize,

    /// Never started because the cycle was cancelled
    pub cancelled: usize,

    /// Stations left ONLINE by this cycle
    pub online: usize,

    /// Stations left OFFLINE by this cycle
    pub offline: usize,

    /// One line per failure, for reporting
    pub errors: Vec<String>,
}

impl CycleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_success(&mut self, status: StationStatus) {
        self.succeeded += 1;
        match status {
            StationStatus::Online => self.online += 1,
            StationStatus::Offline => self.offline += 1,
        }
    }

    pub(crate) fn record_failure(&mut self, station_id: i64, message: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(format!("station {}: {}", station_id, message));
    }

    /// Calculate success rate as a percentage of attempted work
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.attempted as f64) * 100.0
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: CycleReport) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.ineligible += other.ineligible;
        self.cancelled += other.cancelled;
        self.online += other.online;
        self.offline += other.offline;
        self.errors.extend(other.errors);
    }
}
