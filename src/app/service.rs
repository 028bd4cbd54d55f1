//! Application service: the hexagonal core.
//!
//! [`FleetController`] owns the decision engine, the parameter oracle and
//! the suppressed set.  All I/O flows through port traits injected at
//! call sites, making the whole service testable with mock adapters.
//!
//! ```text
//!  FleetDirectory ──▶ ┌─────────────────────────┐ ──▶ CommandTransport
//!  TelemetryStore ──▶ │     FleetController      │ ──▶ ActionLog
//!           Clock ──▶ │ engine · oracle · supp.  │ ──▶ EventSink
//!                     └─────────────────────────┘
//! ```

use std::collections::BTreeSet;

use core::net::IpAddr;

use log::{debug, info, warn};

use crate::config::{ParameterAssignment, SystemConfig};
use crate::control::{Action, DecisionEngine, Mode};
use crate::error::{DecisionError, Error, TransportError};
use crate::fleet::{ActionRecord, DEVICE_1, HouseId, HouseSample};
use crate::protocol::packet::ControlPacket;
use crate::protocol::{CommandTransport, ParameterOracle, TelemetryReading};

use super::events::AppEvent;
use super::ports::{ActionLog, Clock, EventSink, FleetDirectory, TelemetryStore};

// ───────────────────────────────────────────────────────────────
// Reports
// ───────────────────────────────────────────────────────────────

/// Outcome of one decision tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub total_kw: f32,
    pub mode: Mode,
    pub action: Option<Action>,
    /// `(house, on)` for every command that reached its house.
    pub delivered: Vec<(HouseId, bool)>,
    pub failed: Vec<(HouseId, TransportError)>,
}

/// Outcome of a fan-out send (clock sync, parameter push).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub delivered: Vec<HouseId>,
    pub failed: Vec<(HouseId, TransportError)>,
}

/// Outcome of one clock-sync round.  `value` is `None` when no house has
/// reported yet and nothing was sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockSyncReport {
    pub value: Option<u32>,
    pub sends: BroadcastReport,
}

// ───────────────────────────────────────────────────────────────
// FleetController
// ───────────────────────────────────────────────────────────────

pub struct FleetController {
    engine: DecisionEngine,
    oracle: ParameterOracle,
    /// Houses whose device 1 the controller has switched off.
    suppressed: BTreeSet<HouseId>,
    clock_lead_secs: u32,
    tick_count: u64,
}

impl FleetController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            engine: DecisionEngine::new(config.min_usage, config.max_usage),
            oracle: ParameterOracle::new(config.parameters.iter().cloned()),
            suppressed: BTreeSet::new(),
            clock_lead_secs: config.clock_lead_secs,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, dir: &impl FleetDirectory, sink: &mut impl EventSink) {
        let (min_usage, max_usage) = self.engine.thresholds();
        sink.emit(&AppEvent::Started {
            houses: dir.houses().len(),
            min_usage,
            max_usage,
        });
        info!(
            "FleetController started: {} houses, band {}..{} kW",
            dir.houses().len(),
            min_usage,
            max_usage
        );
    }

    // ── Ingestion ─────────────────────────────────────────────

    /// Attribute a reading to the house at `peer` and store it.
    ///
    /// Readings from addresses not in the roster are dropped.
    pub fn ingest(
        &mut self,
        peer: IpAddr,
        reading: TelemetryReading,
        dir: &impl FleetDirectory,
        store: &mut impl TelemetryStore,
        sink: &mut impl EventSink,
    ) -> Option<HouseId> {
        let Some(house) = dir.resolve(peer) else {
            sink.emit(&AppEvent::UnknownSender(peer));
            return None;
        };
        let sample = reading.attribute(house.id);
        store.record(sample);
        sink.emit(&AppEvent::SampleRecorded(sample));
        Some(house.id)
    }

    /// Latest sample of every house that has reported, in roster order.
    pub fn snapshot(dir: &impl FleetDirectory, store: &impl TelemetryStore) -> Vec<HouseSample> {
        dir.houses()
            .iter()
            .filter_map(|h| store.latest(h.id))
            .collect()
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one decision cycle: snapshot → decide → deliver → record.
    ///
    /// Each command is sent independently.  A house's suppressed
    /// membership changes, and its action is recorded, only after its
    /// command was delivered.
    pub fn tick(
        &mut self,
        dir: &impl FleetDirectory,
        store: &impl TelemetryStore,
        transport: &mut impl CommandTransport,
        log: &mut impl ActionLog,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<TickReport, DecisionError> {
        self.tick_count += 1;

        let samples = Self::snapshot(dir, store);
        let total_kw: f32 = samples.iter().map(|s| s.power_usage).sum();
        let mode = self.engine.classify(total_kw);

        let action = match self.engine.decide(&samples, &self.suppressed) {
            Ok(action) => action,
            Err(e) => {
                warn!("Tick {} rejected: {}", self.tick_count, e);
                sink.emit(&AppEvent::DecisionRejected(e));
                return Err(e);
            }
        };
        sink.emit(&AppEvent::Decided {
            total_kw,
            mode,
            action,
        });

        let mut report = TickReport {
            total_kw,
            mode,
            action,
            delivered: Vec::new(),
            failed: Vec::new(),
        };
        let Some(action) = action else {
            debug!("Tick {}: no action ({:?}, {} kW)", self.tick_count, mode, total_kw);
            return Ok(report);
        };

        for (house_id, on) in action.commands() {
            let packet = ControlPacket::device_command(on, DEVICE_1);
            match send_to(dir, transport, house_id, &packet) {
                Ok(()) => {
                    self.apply(house_id, on);
                    let record = ActionRecord {
                        timestamp: clock.unix_now(),
                        device_id: DEVICE_1,
                        state_change: on,
                        house_id,
                    };
                    if let Err(e) = log.append(record) {
                        warn!("Action for house {} not journaled: {}", house_id, e);
                    }
                    sink.emit(&AppEvent::CommandDelivered { house_id, on });
                    report.delivered.push((house_id, on));
                }
                Err(error) => {
                    sink.emit(&AppEvent::CommandFailed {
                        house_id,
                        on,
                        error,
                    });
                    report.failed.push((house_id, error));
                }
            }
        }
        Ok(report)
    }

    // ── Clock synchronisation ─────────────────────────────────

    /// Push `max(latest timestamps) + lead` to every house that has reported.
    pub fn sync_clocks(
        &mut self,
        dir: &impl FleetDirectory,
        store: &impl TelemetryStore,
        transport: &mut impl CommandTransport,
        sink: &mut impl EventSink,
    ) -> ClockSyncReport {
        let samples = Self::snapshot(dir, store);
        let Some(latest) = samples.iter().map(|s| s.timestamp).max() else {
            debug!("Clock sync skipped: no house has reported");
            return ClockSyncReport::default();
        };
        let value = latest.saturating_add(self.clock_lead_secs);
        let packet = ControlPacket::clock_sync(value);

        let targets: Vec<HouseId> = samples.iter().map(|s| s.house_id).collect();
        let sends = broadcast(dir, transport, &targets, &packet);
        sink.emit(&AppEvent::ClockSynced {
            value,
            delivered: sends.delivered.len(),
            failed: sends.failed.len(),
        });
        ClockSyncReport {
            value: Some(value),
            sends,
        }
    }

    // ── Parameter push ────────────────────────────────────────

    /// Build one packet with every assignment and send it to the whole roster.
    ///
    /// The packet is fully built before the first send, so an invalid
    /// assignment fails without any network I/O.
    pub fn push_parameters(
        &self,
        assignments: &[ParameterAssignment],
        dir: &impl FleetDirectory,
        transport: &mut impl CommandTransport,
    ) -> Result<BroadcastReport, Error> {
        if assignments.is_empty() {
            return Ok(BroadcastReport::default());
        }
        let mut packet = ControlPacket::new();
        for a in assignments {
            packet.add_parameter(&self.oracle, a.name.as_str(), a.value)?;
        }
        let targets: Vec<HouseId> = dir.houses().iter().map(|h| h.id).collect();
        let report = broadcast(dir, transport, &targets, &packet);
        info!(
            "Pushed {} parameters to {} houses ({} failed)",
            assignments.len(),
            report.delivered.len(),
            report.failed.len()
        );
        Ok(report)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn suppressed(&self) -> &BTreeSet<HouseId> {
        &self.suppressed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply(&mut self, house_id: HouseId, on: bool) {
        if on {
            self.suppressed.remove(&house_id);
        } else {
            self.suppressed.insert(house_id);
        }
    }
}

fn send_to(
    dir: &impl FleetDirectory,
    transport: &mut impl CommandTransport,
    house_id: HouseId,
    packet: &ControlPacket,
) -> Result<(), TransportError> {
    let addr = dir
        .address_of(house_id)
        .ok_or(TransportError::UnknownHouse(house_id))?;
    transport.send(addr, &packet.encode()).inspect_err(|e| {
        warn!("Send to house {} ({}) failed: {}", house_id, addr, e);
    })
}

fn broadcast(
    dir: &impl FleetDirectory,
    transport: &mut impl CommandTransport,
    targets: &[HouseId],
    packet: &ControlPacket,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for &house_id in targets {
        match send_to(dir, transport, house_id, packet) {
            Ok(()) => report.delivered.push(house_id),
            Err(e) => report.failed.push((house_id, e)),
        }
    }
    report
}
