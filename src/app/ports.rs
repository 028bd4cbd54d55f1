//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FleetController (domain)
//! ```
//!
//! Driven adapters (roster, telemetry store, action journal, clock, event
//! sinks, config storage) implement these traits.  The
//! [`FleetController`](super::service::FleetController) consumes them via
//! generics, so the domain core never touches sockets or files directly.
//!
//! The command transport port lives with the wire protocol in
//! [`crate::protocol::transport`].

use core::net::IpAddr;

use crate::config::SystemConfig;
use crate::fleet::{ActionRecord, House, HouseId, HouseSample};

// ───────────────────────────────────────────────────────────────
// Fleet directory (read-only roster)
// ───────────────────────────────────────────────────────────────

pub trait FleetDirectory {
    /// Every house, in roster order.
    fn houses(&self) -> &[House];

    /// House whose address is `addr`.
    fn resolve(&self, addr: IpAddr) -> Option<&House> {
        self.houses().iter().find(|h| h.address == addr)
    }

    fn address_of(&self, house_id: HouseId) -> Option<IpAddr> {
        self.houses()
            .iter()
            .find(|h| h.id == house_id)
            .map(|h| h.address)
    }
}

// ───────────────────────────────────────────────────────────────
// Telemetry store (driven adapter: ingestion → domain)
// ───────────────────────────────────────────────────────────────

pub trait TelemetryStore {
    /// Record one attributed sample.
    fn record(&mut self, sample: HouseSample);

    /// The sample with the greatest timestamp seen for `house_id`.
    fn latest(&self, house_id: HouseId) -> Option<HouseSample>;
}

// ───────────────────────────────────────────────────────────────
// Action log (driven adapter: domain → persistence)
// ───────────────────────────────────────────────────────────────

/// Append-only audit trail of delivered commands.
///
/// Implementations must not block the control loop; a record that cannot
/// be persisted is reported through [`ActionLogError`] and then dropped.
pub trait ActionLog {
    fn append(&mut self, record: ActionRecord) -> Result<(), ActionLogError>;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    /// Wall-clock time as Unix seconds.
    fn unix_now(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations validate before persisting and reject invalid values
/// with [`ConfigError::ValidationFailed`] instead of clamping them.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the control loop)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a schedule fires.  The main loop implements it by running
/// the matching [`FleetController`](super::service::FleetController)
/// operation.
pub trait SchedulerDelegate {
    /// Called when a schedule fires.
    ///
    /// * `label`: the human-readable label of the schedule that fired.
    /// * `job`  : what the schedule asks for.
    fn on_schedule_fired(&mut self, label: &str, job: Job);
}

/// Work a schedule triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Run one decision tick.
    Decide,
    /// Run one clock-sync round.
    ClockSync,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed to deserialize.
    Corrupted(String),
    /// A config field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(std::io::ErrorKind),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(kind) => write!(f, "I/O error: {}", kind),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from [`ActionLog`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLogError {
    /// The persistence queue is full.
    QueueFull,
    /// Record could not be encoded.
    Encode,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ActionLogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::QueueFull => write!(f, "journal queue full"),
            Self::Encode => write!(f, "record encoding failed"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
