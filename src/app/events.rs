//! Outbound application events.
//!
//! The [`FleetController`](super::service::FleetController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use core::net::IpAddr;

use crate::control::{Action, Mode};
use crate::error::{DecisionError, TransportError};
use crate::fleet::{HouseId, HouseSample};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started with this many houses and thresholds.
    Started {
        houses: usize,
        min_usage: f32,
        max_usage: f32,
    },

    /// A telemetry sample was attributed to a house and stored.
    SampleRecorded(HouseSample),

    /// A datagram arrived from an address not in the roster.
    UnknownSender(IpAddr),

    /// One decision tick completed.
    Decided {
        total_kw: f32,
        mode: Mode,
        action: Option<Action>,
    },

    /// The snapshot was refused by the engine.
    DecisionRejected(DecisionError),

    /// A device command reached the house.
    CommandDelivered { house_id: HouseId, on: bool },

    /// A device command could not be delivered.
    CommandFailed {
        house_id: HouseId,
        on: bool,
        error: TransportError,
    },

    /// A clock-sync round finished.
    ClockSynced {
        value: u32,
        delivered: usize,
        failed: usize,
    },
}
