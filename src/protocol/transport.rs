//! Command transport abstraction.
//!
//! The TCP implementation opens one short-lived connection per command
//! (see `adapters::tcp_transport`).
//!
//! The controller is generic over `CommandTransport`, so tests drive it
//! with a recording mock instead of sockets.

use core::net::IpAddr;

use crate::error::TransportError;

/// Delivers one encoded control packet to a house.
pub trait CommandTransport {
    /// Write the whole of `packet` to the house at `addr`.
    fn send(&mut self, addr: IpAddr, packet: &[u8]) -> Result<(), TransportError>;
}
