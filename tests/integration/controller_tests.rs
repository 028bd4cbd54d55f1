//! Integration tests for the ingest → decide → command → journal pipeline.
//!
//! These run on the host against mock ports and verify the bookkeeping
//! that sits around the decision engine: suppressed-set updates, action
//! records and per-house failure isolation.

use core::net::{IpAddr, Ipv4Addr};

use gridedge::app::events::AppEvent;
use gridedge::app::ports::TelemetryStore;
use gridedge::app::service::FleetController;
use gridedge::config::{ParameterAssignment, SystemConfig};
use gridedge::control::{Action, Mode};
use gridedge::error::{DecisionError, Error, PacketError, ParamRejection, TransportError};
use gridedge::fleet::{ActionRecord, HouseSample};
use gridedge::protocol::{ControlPacket, ParamValue, TelemetryReading};

use crate::mock_fleet::{
    CollectingSink, FixedClock, MemoryActionLog, RecordingTransport, house_ip, roster, store_with,
};

fn controller() -> FleetController {
    FleetController::new(&SystemConfig::default())
}

fn update(store: &mut impl TelemetryStore, house_id: u32, power_usage: f32, temperature: f32, ts: u32) {
    store.record(HouseSample {
        house_id,
        device_state: 1,
        power_usage,
        temperature,
        timestamp: ts,
    });
}

#[test]
fn over_budget_tick_sheds_and_records() {
    let dir = roster(2);
    let store = store_with(&[(1, 6.0, 22.0), (2, 5.0, 10.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::new();
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();

    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &FixedClock(5_000), &mut sink)
        .unwrap();

    assert_eq!(report.mode, Mode::Shed);
    assert_eq!(report.delivered, vec![(1, false)]);
    assert_eq!(tx.sent, vec![(house_ip(1), vec![0x08, 0x01])]);
    assert!(ctl.suppressed().contains(&1));
    assert_eq!(
        log.records,
        vec![ActionRecord {
            timestamp: 5_000,
            device_id: 1,
            state_change: false,
            house_id: 1,
        }]
    );
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::CommandDelivered { house_id: 1, on: false }))
    );
}

#[test]
fn shed_then_restore_returns_house_to_service() {
    let dir = roster(2);
    let mut store = store_with(&[(1, 6.0, 22.0), (2, 5.0, 10.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::new();
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();
    let clock = FixedClock(5_000);

    ctl.tick(&dir, &store, &mut tx, &mut log, &clock, &mut sink)
        .unwrap();
    assert!(ctl.suppressed().contains(&1));

    update(&mut store, 1, 0.5, 18.0, 2_000);
    update(&mut store, 2, 1.0, 10.0, 2_000);
    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &clock, &mut sink)
        .unwrap();

    assert_eq!(report.mode, Mode::Restore);
    assert_eq!(report.delivered, vec![(1, true)]);
    assert_eq!(tx.signals_to(house_ip(1)), vec![(false, 0x01), (true, 0x01)]);
    assert!(ctl.suppressed().is_empty());
    assert_eq!(log.records.len(), 2);
    assert!(log.records[1].state_change);
}

#[test]
fn inside_band_nothing_is_sent() {
    let dir = roster(2);
    let store = store_with(&[(1, 3.0, 20.0), (2, 4.0, 5.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::new();
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();

    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &FixedClock(0), &mut sink)
        .unwrap();

    assert_eq!(report.mode, Mode::Band);
    assert_eq!(report.action, None);
    assert!(tx.sent.is_empty());
    assert!(log.records.is_empty());
    assert_eq!(ctl.tick_count(), 1);
}

#[test]
fn failed_send_leaves_suppressed_set_untouched() {
    let dir = roster(2);
    let store = store_with(&[(1, 6.0, 22.0), (2, 5.0, 10.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::failing([house_ip(1)]);
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();

    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &FixedClock(0), &mut sink)
        .unwrap();

    assert_eq!(report.failed, vec![(1, TransportError::ConnectFailed)]);
    assert!(report.delivered.is_empty());
    assert!(ctl.suppressed().is_empty());
    assert!(log.records.is_empty());

    // Next tick makes the same decision once the house is reachable.
    tx.unreachable.clear();
    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &FixedClock(0), &mut sink)
        .unwrap();
    assert_eq!(report.delivered, vec![(1, false)]);
}

#[test]
fn band_swap_trades_warm_house_for_freezing_one() {
    let dir = roster(2);
    let mut store = store_with(&[(1, 5.5, 10.0), (2, 5.0, 22.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::new();
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();
    let clock = FixedClock(0);

    // Shed house 2 (warmest) first.
    ctl.tick(&dir, &store, &mut tx, &mut log, &clock, &mut sink)
        .unwrap();
    assert!(ctl.suppressed().contains(&2));

    update(&mut store, 1, 4.0, 21.0, 3_000);
    update(&mut store, 2, 3.0, -4.0, 3_000);
    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &clock, &mut sink)
        .unwrap();

    assert_eq!(
        report.action,
        Some(Action::Swap {
            turn_off: 1,
            turn_on: 2
        })
    );
    assert_eq!(report.delivered, vec![(1, false), (2, true)]);
    assert_eq!(ctl.suppressed().iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(log.records.len(), 3);
}

#[test]
fn half_delivered_swap_applies_only_the_delivered_half() {
    let dir = roster(2);
    let mut store = store_with(&[(1, 5.5, 10.0), (2, 5.0, 22.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::new();
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();
    let clock = FixedClock(0);

    ctl.tick(&dir, &store, &mut tx, &mut log, &clock, &mut sink)
        .unwrap();

    update(&mut store, 1, 4.0, 21.0, 3_000);
    update(&mut store, 2, 3.0, -4.0, 3_000);
    tx.unreachable.insert(house_ip(2));
    let report = ctl
        .tick(&dir, &store, &mut tx, &mut log, &clock, &mut sink)
        .unwrap();

    assert_eq!(report.delivered, vec![(1, false)]);
    assert_eq!(report.failed, vec![(2, TransportError::ConnectFailed)]);
    assert_eq!(
        ctl.suppressed().iter().copied().collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(log.records.len(), 2);
}

#[test]
fn non_finite_sample_rejects_the_tick() {
    let dir = roster(2);
    let store = store_with(&[(1, f32::NAN, 22.0), (2, 5.0, 10.0)]);
    let mut ctl = controller();
    let mut tx = RecordingTransport::new();
    let mut log = MemoryActionLog::default();
    let mut sink = CollectingSink::default();

    let err = ctl
        .tick(&dir, &store, &mut tx, &mut log, &FixedClock(0), &mut sink)
        .unwrap_err();

    assert_eq!(err, DecisionError::NonFiniteReading(1));
    assert!(tx.sent.is_empty());
    assert!(matches!(sink.events.last(), Some(AppEvent::DecisionRejected(_))));
}

#[test]
fn snapshot_follows_roster_and_skips_silent_houses() {
    let dir = roster(3);
    let store = store_with(&[(3, 1.0, 1.0), (1, 2.0, 2.0)]);
    let ids: Vec<_> = FleetController::snapshot(&dir, &store)
        .iter()
        .map(|s| s.house_id)
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn ingest_attributes_by_sender_address() {
    let dir = roster(2);
    let mut store = store_with(&[]);
    let mut ctl = controller();
    let mut sink = CollectingSink::default();
    let reading = TelemetryReading {
        device_state: 1,
        power_usage: 2.0,
        temperature: 19.0,
        timestamp: 777,
    };

    assert_eq!(
        ctl.ingest(house_ip(2), reading, &dir, &mut store, &mut sink),
        Some(2)
    );
    assert_eq!(store.latest(2).map(|s| s.timestamp), Some(777));

    let stranger = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50));
    assert_eq!(ctl.ingest(stranger, reading, &dir, &mut store, &mut sink), None);
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::UnknownSender(addr)) if *addr == stranger
    ));
    assert!(store.latest(1).is_none());
}

#[test]
fn parameter_push_sends_one_packet_to_every_house() {
    let dir = roster(3);
    let ctl = controller();
    let mut tx = RecordingTransport::new();
    let assignments = vec![
        ParameterAssignment {
            name: "target_temperature".into(),
            value: ParamValue::Float(21.5),
        },
        ParameterAssignment {
            name: "heater_enabled".into(),
            value: ParamValue::Bool(true),
        },
    ];

    let report = ctl.push_parameters(&assignments, &dir, &mut tx).unwrap();
    assert_eq!(report.delivered, vec![1, 2, 3]);
    assert_eq!(tx.sent.len(), 3);

    let packet = ControlPacket::from_bytes(&tx.sent[0].1).unwrap();
    let ids: Vec<u8> = packet
        .decode()
        .unwrap()
        .parameters
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(tx.sent.iter().all(|(_, bytes)| *bytes == tx.sent[0].1));
}

#[test]
fn invalid_parameter_push_sends_nothing() {
    let dir = roster(3);
    let ctl = controller();
    let mut tx = RecordingTransport::new();
    let assignments = vec![
        ParameterAssignment {
            name: "heater_enabled".into(),
            value: ParamValue::Bool(true),
        },
        ParameterAssignment {
            name: "fan_speed".into(),
            value: ParamValue::Int(3),
        },
    ];

    let err = ctl.push_parameters(&assignments, &dir, &mut tx).unwrap_err();
    assert_eq!(
        err,
        Error::Packet(PacketError::InvalidParameter(ParamRejection::UnknownName(
            "fan_speed".into()
        )))
    );
    assert!(tx.sent.is_empty());

    assert!(ctl.push_parameters(&[], &dir, &mut tx).unwrap().delivered.is_empty());
    assert!(tx.sent.is_empty());
}
