//! In-memory roster and telemetry store.
//!
//! The controller only ever needs the newest sample per house, so the
//! store keeps exactly that.  History lives in the log.

use std::collections::BTreeMap;

use crate::app::ports::{FleetDirectory, TelemetryStore};
use crate::fleet::{House, HouseId, HouseSample};

/// Fixed roster loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    houses: Vec<House>,
}

impl StaticDirectory {
    pub fn new(houses: Vec<House>) -> Self {
        Self { houses }
    }
}

impl FleetDirectory for StaticDirectory {
    fn houses(&self) -> &[House] {
        &self.houses
    }
}

#[derive(Debug, Default)]
pub struct MemoryTelemetryStore {
    latest: BTreeMap<HouseId, HouseSample>,
    recorded: u64,
}

impl MemoryTelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples accepted since startup, including superseded ones.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }
}

impl TelemetryStore for MemoryTelemetryStore {
    /// A sample older than the stored one is counted but not kept.  On
    /// equal timestamps the newer arrival wins.
    fn record(&mut self, sample: HouseSample) {
        self.recorded += 1;
        match self.latest.get(&sample.house_id) {
            Some(current) if current.timestamp > sample.timestamp => {}
            _ => {
                self.latest.insert(sample.house_id, sample);
            }
        }
    }

    fn latest(&self, house_id: HouseId) -> Option<HouseSample> {
        self.latest.get(&house_id).copied()
    }
}
