//! Inter-thread channels between the I/O task and the control loop.
//!
//! Uses `embassy-sync` bounded MPMC channels.  Both sides share these
//! statics; they carry data only, never controller state.
//!
//! ```text
//! ┌──────────────┐  IngestMsg    ┌──────────────┐
//! │   I/O Task   │─────────────▶│ Control Loop │
//! │  (async)     │◀─────────────│  (sync)      │
//! └──────────────┘  ActionRecord └──────────────┘
//! ```

use core::net::IpAddr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::fleet::ActionRecord;
use crate::protocol::TelemetryReading;

/// A decoded datagram and the address it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestMsg {
    pub peer: IpAddr,
    pub reading: TelemetryReading,
}

/// Channel depth for inbound telemetry.
const INGEST_DEPTH: usize = 64;

/// Channel depth for action records awaiting the journal.
const JOURNAL_DEPTH: usize = 32;

pub type IngestChannel = Channel<CriticalSectionRawMutex, IngestMsg, INGEST_DEPTH>;
pub type JournalChannel = Channel<CriticalSectionRawMutex, ActionRecord, JOURNAL_DEPTH>;

/// Inbound telemetry: I/O task → control loop.
pub static INGEST_CHANNEL: IngestChannel = Channel::new();

/// Delivered actions: control loop → I/O task (journal writer).
pub static JOURNAL_CHANNEL: JournalChannel = Channel::new();

/// Drain every pending telemetry message without blocking.
pub fn drain_ingest(channel: &IngestChannel) -> impl Iterator<Item = IngestMsg> + '_ {
    core::iter::from_fn(move || channel.try_receive().ok())
}
