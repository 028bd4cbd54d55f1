//! TCP command transport adapter.
//!
//! Implements [`CommandTransport`]: one short-lived connection per control
//! packet.
//!
//! 1. connect to `(house ip, command port)`, bounded by the send timeout
//! 2. write the whole packet, bounded by the same timeout
//! 3. close
//!
//! Houses send no application-level acknowledgement; a completed write
//! counts as delivered.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use core::net::IpAddr;

use log::debug;

use crate::error::TransportError;
use crate::protocol::CommandTransport;

/// Default port every house listens on for control packets.
pub const DEFAULT_PORT: u16 = 42069;

pub struct TcpCommandTransport {
    port: u16,
    timeout: Duration,
}

impl TcpCommandTransport {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

impl CommandTransport for TcpCommandTransport {
    fn send(&mut self, addr: IpAddr, packet: &[u8]) -> Result<(), TransportError> {
        let target = SocketAddr::new(addr, self.port);
        let mut stream =
            TcpStream::connect_timeout(&target, self.timeout).map_err(connect_error)?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|_| TransportError::Io)?;
        stream.write_all(packet).map_err(write_error)?;
        stream.flush().map_err(write_error)?;
        // The peer may already have closed; the bytes are out either way.
        let _ = stream.shutdown(Shutdown::Both);
        debug!("TCP: {} bytes to {}", packet.len(), target);
        Ok(())
    }
}

fn connect_error(e: io::Error) -> TransportError {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::TimedOut,
        _ => TransportError::ConnectFailed,
    }
}

fn write_error(e: io::Error) -> TransportError {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::TimedOut,
        io::ErrorKind::WriteZero => TransportError::ShortWrite,
        _ => TransportError::Io,
    }
}
