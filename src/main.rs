//! GridEdge: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UdpTelemetryReceiver  TcpCommandTransport  JsonConfigFile      │
//! │  StaticDirectory       MemoryTelemetryStore LogEventSink        │
//! │  ActionJournal / QueuedActionLog            SystemClock         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            FleetController (pure logic)                │    │
//! │  │  DecisionEngine · ParameterOracle · suppressed set     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · I/O thread (edge-executor)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use gridedge::adapters::journal::{ActionJournal, QueuedActionLog};
use gridedge::adapters::json_config::JsonConfigFile;
use gridedge::adapters::log_sink::LogEventSink;
use gridedge::adapters::memory_store::{MemoryTelemetryStore, StaticDirectory};
use gridedge::adapters::tcp_transport::TcpCommandTransport;
use gridedge::adapters::time::SystemClock;
use gridedge::adapters::udp_receiver::UdpTelemetryReceiver;
use gridedge::app::ports::{ConfigPort, Job, SchedulerDelegate};
use gridedge::app::service::FleetController;
use gridedge::net::channels::{INGEST_CHANNEL, JOURNAL_CHANNEL, drain_ingest};
use gridedge::net::io_task;
use gridedge::scheduler::Scheduler;

#[derive(Parser, Debug)]
#[command(name = "gridedge", version, about = "Demand-response edge controller")]
struct Args {
    /// JSON configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "gridedge.json")]
    config: PathBuf,
}

// ── Scheduler delegate ────────────────────────────────────────
//
// Collects fired jobs so the loop can run them after the scheduler
// tick, with the controller and adapters borrowed normally.

#[derive(Default)]
struct JobQueue {
    pending: heapless::Vec<Job, 4>,
}

impl SchedulerDelegate for JobQueue {
    fn on_schedule_fired(&mut self, label: &str, job: Job) {
        if self.pending.push(job).is_err() {
            warn!("Schedule '{}' dropped: job queue full", label);
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("GridEdge v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let args = Args::parse();
    let config = JsonConfigFile::new(&args.config)
        .load()
        .with_context(|| format!("loading {}", args.config.display()))?;
    let roster = config.roster()?;

    // ── 3. Adapters ───────────────────────────────────────────
    let dir = StaticDirectory::new(roster);
    let mut store = MemoryTelemetryStore::new();
    let mut transport = TcpCommandTransport::new(
        config.command_port,
        Duration::from_millis(u64::from(config.send_timeout_ms)),
    );
    let mut action_log = QueuedActionLog::new(&JOURNAL_CHANNEL);
    let clock = SystemClock::new();
    let mut log_sink = LogEventSink::new();

    let receiver = UdpTelemetryReceiver::bind(config.telemetry_port)
        .with_context(|| format!("binding telemetry port {}", config.telemetry_port))?;
    let journal = match &config.journal_path {
        Some(path) => {
            Some(ActionJournal::open(path).with_context(|| format!("opening journal {path}"))?)
        }
        None => None,
    };
    let _io = io_task::spawn(receiver, journal).context("spawning I/O thread")?;

    // ── 4. Controller ─────────────────────────────────────────
    let mut controller = FleetController::new(&config);
    controller.start(&dir, &mut log_sink);

    let pushed = controller.push_parameters(&config.parameter_assignments, &dir, &mut transport)?;
    if !pushed.failed.is_empty() {
        warn!("Parameter push failed for {} houses", pushed.failed.len());
    }

    let mut sched = Scheduler::from_config(&config);
    let mut jobs = JobQueue::default();
    let tick_secs = config.tick_secs();
    let period = Duration::from_millis(u64::from(config.control_loop_interval_ms));

    info!(
        "Listening for telemetry on :{}, commands to :{}",
        config.telemetry_port, config.command_port
    );

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        std::thread::sleep(period);

        for msg in drain_ingest(&INGEST_CHANNEL) {
            controller.ingest(msg.peer, msg.reading, &dir, &mut store, &mut log_sink);
        }

        sched.tick(tick_secs, &mut jobs);

        for job in core::mem::take(&mut jobs.pending) {
            match job {
                Job::Decide => {
                    // Rejections are already reported through the sink.
                    let _ = controller.tick(
                        &dir,
                        &store,
                        &mut transport,
                        &mut action_log,
                        &clock,
                        &mut log_sink,
                    );
                }
                Job::ClockSync => {
                    controller.sync_clocks(&dir, &store, &mut transport, &mut log_sink);
                }
            }
        }
    }
}
