//! Wire protocol between the edge controller and household sub-controllers.
//!
//! ```text
//! ┌──────────────┐  telemetry (UDP, 13B)   ┌──────────────┐
//! │    House     │────────────────────────▶│  Controller  │
//! │ sub-control  │◀────────────────────────│   (edge)     │
//! └──────────────┘  control packet (TCP)   └──────────────┘
//! ```
//!
//! Control packets are built against a [`oracle::ParameterOracle`] so that
//! only declared, correctly typed parameters reach the wire.

pub mod framing;
pub mod oracle;
pub mod packet;
pub mod params;
pub mod telemetry;
pub mod transport;

pub use oracle::{ParamKey, ParameterOracle, ParameterSpec};
pub use packet::{ControlPacket, DecodedPacket};
pub use params::{ParamType, ParamValue, Parameter};
pub use telemetry::TelemetryReading;
pub use transport::CommandTransport;
