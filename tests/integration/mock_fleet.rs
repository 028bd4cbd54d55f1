//! Mock ports for integration tests.
//!
//! Records every command sent and every action journaled so tests can
//! assert on the full history without opening a socket.

use std::collections::BTreeSet;

use core::net::{IpAddr, Ipv4Addr};

use gridedge::adapters::memory_store::{MemoryTelemetryStore, StaticDirectory};
use gridedge::app::events::AppEvent;
use gridedge::app::ports::{ActionLog, ActionLogError, Clock, EventSink, TelemetryStore};
use gridedge::error::TransportError;
use gridedge::fleet::{ActionRecord, House, HouseId, HouseSample};
use gridedge::protocol::{CommandTransport, ControlPacket};

// ── Roster ────────────────────────────────────────────────────

pub fn house_ip(id: HouseId) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 10, 0, 100 + id as u8))
}

/// Houses `1..=n` at `10.10.0.101..`.
pub fn roster(n: HouseId) -> StaticDirectory {
    StaticDirectory::new(
        (1..=n)
            .map(|id| House {
                id,
                name: heapless::String::try_from(format!("House {id}").as_str()).unwrap(),
                address: house_ip(id),
            })
            .collect(),
    )
}

/// Store pre-filled with `(house, power kW, temperature °C)` samples.
pub fn store_with(samples: &[(HouseId, f32, f32)]) -> MemoryTelemetryStore {
    let mut store = MemoryTelemetryStore::new();
    for &(house_id, power_usage, temperature) in samples {
        store.record(HouseSample {
            house_id,
            device_state: 1,
            power_usage,
            temperature,
            timestamp: 1_000 + house_id,
        });
    }
    store
}

// ── Transport ─────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<(IpAddr, Vec<u8>)>,
    /// Addresses whose sends fail.
    pub unreachable: BTreeSet<IpAddr>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            sent: Vec::new(),
            unreachable: addrs.into_iter().collect(),
        }
    }

    /// Decoded `(on, devices)` signal of every packet sent to `addr`.
    pub fn signals_to(&self, addr: IpAddr) -> Vec<(bool, u8)> {
        self.sent
            .iter()
            .filter(|(a, _)| *a == addr)
            .filter_map(|(_, bytes)| ControlPacket::from_bytes(bytes).ok()?.device_signal())
            .collect()
    }
}

impl CommandTransport for RecordingTransport {
    fn send(&mut self, addr: IpAddr, packet: &[u8]) -> Result<(), TransportError> {
        if self.unreachable.contains(&addr) {
            return Err(TransportError::ConnectFailed);
        }
        self.sent.push((addr, packet.to_vec()));
        Ok(())
    }
}

// ── Action log ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryActionLog {
    pub records: Vec<ActionRecord>,
}

impl ActionLog for MemoryActionLog {
    fn append(&mut self, record: ActionRecord) -> Result<(), ActionLogError> {
        self.records.push(record);
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn unix_now(&self) -> u32 {
        self.0
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
