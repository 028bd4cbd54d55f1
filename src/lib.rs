//! GridEdge controller library.
//!
//! Demand-response edge controller for a fleet of household power
//! sub-controllers.  The binary in `main.rs` wires these modules to real
//! sockets; everything here is usable from tests with mock ports.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fleet;
pub mod net;
pub mod protocol;
pub mod scheduler;

pub use error::{Error, Result};
