//! UDP telemetry receiver adapter.
//!
//! A non-blocking socket polled by the I/O task.  Each datagram is
//! decoded on arrival; attribution to a house happens later, on the
//! control loop, against the fleet directory.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use core::net::IpAddr;

use crate::error::TelemetryError;
use crate::protocol::TelemetryReading;

/// Default port houses report telemetry to.
pub const DEFAULT_PORT: u16 = 42070;

/// Receive buffer; a valid datagram is 13 bytes.
const RECV_BUF_SIZE: usize = 1024;

/// Outcome of one datagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Received {
    Reading(IpAddr, TelemetryReading),
    Rejected(IpAddr, TelemetryError),
}

pub struct UdpTelemetryReceiver {
    socket: UdpSocket,
    buf: [u8; RECV_BUF_SIZE],
}

impl UdpTelemetryReceiver {
    /// Bind on all interfaces.
    pub fn bind(port: u16) -> io::Result<Self> {
        Self::bind_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    pub fn bind_addr(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            buf: [0; RECV_BUF_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Take one pending datagram, if any.  Never blocks.
    pub fn try_recv(&mut self) -> io::Result<Option<Received>> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, peer)) => {
                let ip = peer.ip();
                Ok(Some(match TelemetryReading::decode(&self.buf[..len]) {
                    Ok(reading) => Received::Reading(ip, reading),
                    Err(e) => Received::Rejected(ip, e),
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
