//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the edge controller:
//! telemetry attribution, the decision tick, clock synchronisation and the
//! suppressed-set bookkeeping.  All interaction with sockets and files
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without a network.

pub mod events;
pub mod ports;
pub mod service;
