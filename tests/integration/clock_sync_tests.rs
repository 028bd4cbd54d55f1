//! Integration tests for fleet clock synchronisation.

use gridedge::app::events::AppEvent;
use gridedge::app::ports::TelemetryStore;
use gridedge::app::service::FleetController;
use gridedge::config::SystemConfig;
use gridedge::error::TransportError;
use gridedge::fleet::HouseSample;
use gridedge::protocol::ControlPacket;

use crate::mock_fleet::{CollectingSink, RecordingTransport, house_ip, roster, store_with};

#[test]
fn no_reports_means_no_sync() {
    let dir = roster(3);
    let store = store_with(&[]);
    let mut ctl = FleetController::new(&SystemConfig::default());
    let mut tx = RecordingTransport::new();
    let mut sink = CollectingSink::default();

    let report = ctl.sync_clocks(&dir, &store, &mut tx, &mut sink);
    assert_eq!(report.value, None);
    assert!(tx.sent.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn newest_clock_plus_lead_goes_to_reporting_houses() {
    let dir = roster(3);
    // Timestamps 1001 and 1003 (store_with uses 1000 + id).
    let store = store_with(&[(1, 1.0, 20.0), (3, 1.0, 20.0)]);
    let mut ctl = FleetController::new(&SystemConfig::default());
    let mut tx = RecordingTransport::new();
    let mut sink = CollectingSink::default();

    let report = ctl.sync_clocks(&dir, &store, &mut tx, &mut sink);

    assert_eq!(report.value, Some(1_063));
    assert_eq!(report.sends.delivered, vec![1, 3]);
    let targets: Vec<_> = tx.sent.iter().map(|(a, _)| *a).collect();
    assert_eq!(targets, vec![house_ip(1), house_ip(3)]);
    for (_, bytes) in &tx.sent {
        assert_eq!(bytes, &ControlPacket::clock_sync(1_063).encode());
        assert_eq!(bytes[0], 0x01);
    }
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::ClockSynced {
            value: 1_063,
            delivered: 2,
            failed: 0
        })
    ));
}

#[test]
fn lead_is_configurable_and_saturates() {
    let dir = roster(1);
    let mut store = store_with(&[]);
    store.record(HouseSample {
        house_id: 1,
        device_state: 0,
        power_usage: 0.0,
        temperature: 0.0,
        timestamp: u32::MAX - 5,
    });
    let cfg = SystemConfig {
        clock_lead_secs: 10,
        ..SystemConfig::default()
    };
    let mut ctl = FleetController::new(&cfg);
    let mut tx = RecordingTransport::new();
    let mut sink = CollectingSink::default();

    assert_eq!(
        ctl.sync_clocks(&dir, &store, &mut tx, &mut sink).value,
        Some(u32::MAX)
    );
}

#[test]
fn unreachable_house_does_not_stop_the_round() {
    let dir = roster(3);
    let store = store_with(&[(1, 1.0, 20.0), (2, 1.0, 20.0), (3, 1.0, 20.0)]);
    let mut ctl = FleetController::new(&SystemConfig::default());
    let mut tx = RecordingTransport::failing([house_ip(2)]);
    let mut sink = CollectingSink::default();

    let report = ctl.sync_clocks(&dir, &store, &mut tx, &mut sink);

    assert_eq!(report.sends.delivered, vec![1, 3]);
    assert_eq!(report.sends.failed, vec![(2, TransportError::ConnectFailed)]);
}
