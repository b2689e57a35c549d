//! Station-configuration collaborator

use crate::Result;
use crate::app::models::StationConfig;

/// Source of per-station configuration records
pub trait StationDirectory: Send + Sync {
    fn stations(&self) -> Result<Vec<StationConfig>>;

    fn station(&self, station_id: i64) -> Result<Option<StationConfig>> {
        Ok(self
            .stations()?
            .into_iter()
            .find(|s| s.station_id == station_id))
    }
}

/// Directory over a fixed list, typically the `stations` section of the config file
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    stations: Vec<StationConfig>,
}

impl StaticDirectory {
    pub fn new(stations: Vec<StationConfig>) -> Self {
        Self { stations }
    }
}

impl StationDirectory for StaticDirectory {
    fn stations(&self) -> Result<Vec<StationConfig>> {
        Ok(self.stations.clone())
    }
}
