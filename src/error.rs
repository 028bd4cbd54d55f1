//! Unified error types for the edge controller.
//!
//! Each subsystem has its own small error enum; every one of them converts
//! into the top-level [`Error`] so the control loop can log failures
//! uniformly.  "No action this tick" is never an error; see
//! [`DecisionEngine::decide`](crate::control::decision::DecisionEngine::decide).

use core::fmt;

use crate::fleet::HouseId;
use crate::protocol::params::ParamType;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A control packet could not be built or parsed.
    Packet(PacketError),
    /// The decision engine was handed a structurally invalid snapshot.
    Decision(DecisionError),
    /// A telemetry datagram could not be decoded.
    Telemetry(TelemetryError),
    /// A command could not be delivered to a house.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packet(e) => write!(f, "packet: {e}"),
            Self::Decision(e) => write!(f, "decision: {e}"),
            Self::Telemetry(e) => write!(f, "telemetry: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Packet errors
// ---------------------------------------------------------------------------

/// Payload fields of a control packet, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ClockSync,
    Parameters,
    DeviceSignal,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockSync => write!(f, "clock-sync"),
            Self::Parameters => write!(f, "parameter list"),
            Self::DeviceSignal => write!(f, "device signal"),
        }
    }
}

/// Why a parameter was rejected by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRejection {
    /// No parameter with this id is declared.
    UnknownId(u8),
    /// No parameter with this name is declared.
    UnknownName(String),
    /// The value's runtime type differs from the declared type.
    TypeMismatch {
        id: u8,
        expected: ParamType,
        found: ParamType,
    },
}

impl fmt::Display for ParamRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "unknown parameter id {id}"),
            Self::UnknownName(name) => write!(f, "unknown parameter '{name}'"),
            Self::TypeMismatch {
                id,
                expected,
                found,
            } => write!(f, "parameter {id} expects {expected}, got {found}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Unknown parameter, or a value of the wrong type.
    InvalidParameter(ParamRejection),
    /// A flag bit claims a field that has no data behind it.
    MissingField(Field),
    /// The parameter list already holds the maximum number of entries.
    ParameterListFull,
    /// Raw bytes do not form a valid packet.
    Malformed(&'static str),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(e) => write!(f, "invalid parameter: {e}"),
            Self::MissingField(field) => write!(f, "{field} flagged but not set"),
            Self::ParameterListFull => write!(f, "parameter list full"),
            Self::Malformed(msg) => write!(f, "malformed packet: {msg}"),
        }
    }
}

impl From<PacketError> for Error {
    fn from(e: PacketError) -> Self {
        Self::Packet(e)
    }
}

impl From<ParamRejection> for PacketError {
    fn from(e: ParamRejection) -> Self {
        Self::InvalidParameter(e)
    }
}

// ---------------------------------------------------------------------------
// Decision errors
// ---------------------------------------------------------------------------

/// The snapshot handed to the engine violates the caller contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionError {
    /// Two samples carry the same house id.
    DuplicateHouse(HouseId),
    /// A sample carries a NaN or infinite power or temperature reading.
    NonFiniteReading(HouseId),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateHouse(id) => write!(f, "duplicate sample for house {id}"),
            Self::NonFiniteReading(id) => write!(f, "non-finite reading from house {id}"),
        }
    }
}

impl From<DecisionError> for Error {
    fn from(e: DecisionError) -> Self {
        Self::Decision(e)
    }
}

// ---------------------------------------------------------------------------
// Telemetry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// Datagram shorter than the fixed payload.
    TooShort(usize),
    /// Power or temperature decoded to NaN or infinity.
    NonFinite,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(f, "datagram too short ({len} bytes)"),
            Self::NonFinite => write!(f, "non-finite reading"),
        }
    }
}

impl From<TelemetryError> for Error {
    fn from(e: TelemetryError) -> Self {
        Self::Telemetry(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Per-house delivery failure.  Never aborts a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The directory has no address for the house.
    UnknownHouse(HouseId),
    /// The connection could not be established.
    ConnectFailed,
    /// Connect or write exceeded the send timeout.
    TimedOut,
    /// The peer accepted fewer bytes than the packet length.
    ShortWrite,
    /// Any other socket error.
    Io,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHouse(id) => write!(f, "no address for house {id}"),
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::TimedOut => write!(f, "timed out"),
            Self::ShortWrite => write!(f, "short write"),
            Self::Io => write!(f, "socket I/O error"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
