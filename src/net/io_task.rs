//! Async I/O task: telemetry intake and journal writer.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! multi-task scheduling and `async-io-mini` for reactor-driven timers.
//! Two concurrent futures:
//!
//! 1. **Ingest**: polls the UDP socket every 10ms via reactor timer and
//!    forwards decoded readings over `INGEST_CHANNEL`
//! 2. **Journal**: truly async via `JOURNAL_CHANNEL.receive().await`
//!    (wakes as soon as the control loop queues a record)
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────┐
//!  │  I/O Thread                                          │
//!  │  ┌────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                  │  │
//!  │  │                                                │  │
//!  │  │  ┌────────────┐        ┌──────────────────┐    │  │
//!  │  │  │  Ingest    │        │ Journal (async)  │    │  │
//!  │  │  │  10ms ⏱    │        │ wake-on-send     │    │  │
//!  │  │  └────────────┘        └──────────────────┘    │  │
//!  │  └────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────┘
//! ```

use core::time::Duration;

use log::{debug, info, warn};

use super::channels::{INGEST_CHANNEL, IngestMsg, JOURNAL_CHANNEL};
use crate::adapters::journal::ActionJournal;
use crate::adapters::udp_receiver::{Received, UdpTelemetryReceiver};
use crate::app::ports::ActionLog;

/// Socket poll period.
const INGEST_POLL: Duration = Duration::from_millis(10);

/// Back-off after a socket error.
const ERROR_BACKOFF: Duration = Duration::from_millis(500);

// ── Async loops ──────────────────────────────────────────────

/// Ingest task: drains every pending datagram, then sleeps one poll period.
async fn ingest_loop(mut receiver: UdpTelemetryReceiver) {
    loop {
        loop {
            match receiver.try_recv() {
                Ok(Some(Received::Reading(peer, reading))) => {
                    if INGEST_CHANNEL.try_send(IngestMsg { peer, reading }).is_err() {
                        warn!("IO: ingest channel full, dropping datagram from {}", peer);
                    }
                }
                Ok(Some(Received::Rejected(peer, e))) => {
                    warn!("IO: bad datagram from {}: {}", peer, e);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("IO: telemetry socket error: {}", e);
                    async_io_mini::Timer::after(ERROR_BACKOFF).await;
                    break;
                }
            }
        }
        async_io_mini::Timer::after(INGEST_POLL).await;
    }
}

/// Journal task: persists each queued record, or only logs it when no
/// journal file is configured.
async fn journal_loop(mut journal: Option<ActionJournal>) {
    loop {
        let record = JOURNAL_CHANNEL.receive().await;
        match journal.as_mut() {
            Some(j) => {
                if let Err(e) = j.append(record) {
                    warn!("IO: journal append failed for house {}: {}", record.house_id, e);
                }
            }
            None => debug!("IO: unjournaled action {:?}", record),
        }
    }
}

/// Entry point for the I/O thread.  Sets up the executor, spawns both
/// tasks, and drives them until the process exits.
fn run_io_loop(receiver: UdpTelemetryReceiver, journal: Option<ActionJournal>) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    executor.spawn(ingest_loop(receiver)).detach();
    executor.spawn(journal_loop(journal)).detach();

    info!("IO task started (async, reactor-driven)");

    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

// ── Thread spawn ─────────────────────────────────────────────

/// Spawn the I/O task in a dedicated named thread.
///
/// Takes ownership of the telemetry socket and the journal file.
pub fn spawn(
    receiver: UdpTelemetryReceiver,
    journal: Option<ActionJournal>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("gridedge-io".into())
        .spawn(move || run_io_loop(receiver, journal))
}
