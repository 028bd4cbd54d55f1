//! Control packet codec.
//!
//! Wire format:
//! ```text
//! ┌───────────┬──────────────┬───────────────────────────────────┬─────────────┐
//! │ Flags (1B)│ Clock (4B BE)│ Count (1B) · (id, size, data)×N   │ Devices (1B)│
//! │           │ iff bit 0    │ iff bit 1, sorted by id           │ iff bit 3   │
//! └───────────┴──────────────┴───────────────────────────────────┴─────────────┘
//! ```
//!
//! Bit 2 of the flag byte is not a presence bit: it carries the on/off
//! value that applies to the device mask, and is only meaningful when
//! bit 3 is set.
//!
//! Every mutation goes through [`ControlPacket::recompile`], which decodes
//! the current body, overlays the new field and re-serializes the whole
//! body.  A packet therefore never claims a field it has no data for.

use crate::error::{Field, PacketError};

use super::oracle::{ParamKey, ParameterOracle};
use super::params::{MAX_PARAM_SIZE, ParamData, ParamValue, Parameter};

pub const FLAG_CLOCK_SYNC: u8 = 0b0000_0001;
pub const FLAG_PARAMETERS: u8 = 0b0000_0010;
pub const FLAG_DEVICE_ON: u8 = 0b0000_0100;
pub const FLAG_DEVICE_SIGNAL: u8 = 0b0000_1000;

const KNOWN_FLAGS: u8 = FLAG_CLOCK_SYNC | FLAG_PARAMETERS | FLAG_DEVICE_ON | FLAG_DEVICE_SIGNAL;

/// The count byte bounds the list length.
pub const MAX_PARAMETERS: usize = u8::MAX as usize;

/// Fields recovered from a packet body.  `None` means the flag bit is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPacket {
    pub clock: Option<u32>,
    pub parameters: Option<Vec<Parameter>>,
    pub devices: Option<u8>,
}

/// New value supplied by the `add_*` call that triggered a recompile.
#[derive(Default)]
struct Overlay {
    clock: Option<u32>,
    parameter: Option<Parameter>,
    devices: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlPacket {
    flags: u8,
    body: Vec<u8>,
}

impl ControlPacket {
    pub fn new() -> Self {
        Self::default()
    }

    /// A packet carrying only a device on/off signal.
    pub fn device_command(on: bool, devices: u8) -> Self {
        Self {
            flags: FLAG_DEVICE_SIGNAL | if on { FLAG_DEVICE_ON } else { 0 },
            body: vec![devices],
        }
    }

    /// A packet carrying only a clock-sync timestamp.
    pub fn clock_sync(value: u32) -> Self {
        Self {
            flags: FLAG_CLOCK_SYNC,
            body: value.to_be_bytes().to_vec(),
        }
    }

    /// Parse raw bytes.  The whole input must be consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        let (&flags, body) = bytes
            .split_first()
            .ok_or(PacketError::Malformed("empty packet"))?;
        if flags & !KNOWN_FLAGS != 0 {
            return Err(PacketError::Malformed("unknown flag bits"));
        }
        let (_, consumed) = parse_body(flags, body)?;
        if consumed != body.len() {
            return Err(PacketError::Malformed("trailing bytes after last field"));
        }
        Ok(Self {
            flags,
            body: body.to_vec(),
        })
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    // ── Mutations ─────────────────────────────────────────────

    pub fn add_clock_sync(&mut self, value: u32) -> Result<(), PacketError> {
        self.recompile(
            self.flags | FLAG_CLOCK_SYNC,
            Overlay {
                clock: Some(value),
                ..Overlay::default()
            },
        )
    }

    /// Add (or replace) a parameter, resolved and type-checked by `oracle`.
    ///
    /// On rejection the packet is left untouched.
    pub fn add_parameter<'k>(
        &mut self,
        oracle: &ParameterOracle,
        key: impl Into<ParamKey<'k>>,
        value: impl Into<ParamValue>,
    ) -> Result<(), PacketError> {
        let parameter = oracle.encode(key.into(), value.into())?;
        self.recompile(
            self.flags | FLAG_PARAMETERS,
            Overlay {
                parameter: Some(parameter),
                ..Overlay::default()
            },
        )
    }

    pub fn add_device_signal(&mut self, on: bool, devices: u8) -> Result<(), PacketError> {
        let mut flags = (self.flags | FLAG_DEVICE_SIGNAL) & !FLAG_DEVICE_ON;
        if on {
            flags |= FLAG_DEVICE_ON;
        }
        self.recompile(
            flags,
            Overlay {
                devices: Some(devices),
                ..Overlay::default()
            },
        )
    }

    /// Replace the flag byte and recompile the body against it.
    ///
    /// Clearing a presence bit drops that field.  Setting one that has no
    /// data fails with [`PacketError::MissingField`].
    pub fn set_flags(&mut self, flags: u8) -> Result<(), PacketError> {
        if flags & !KNOWN_FLAGS != 0 {
            return Err(PacketError::Malformed("unknown flag bits"));
        }
        self.recompile(flags, Overlay::default())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn decode(&self) -> Result<DecodedPacket, PacketError> {
        parse_body(self.flags, &self.body).map(|(decoded, _)| decoded)
    }

    /// `(on, devices)` when the packet carries a device signal.
    pub fn device_signal(&self) -> Option<(bool, u8)> {
        if self.flags & FLAG_DEVICE_SIGNAL == 0 {
            return None;
        }
        let devices = *self.body.last()?;
        Some((self.flags & FLAG_DEVICE_ON != 0, devices))
    }

    /// `flags ++ body`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.body.len());
        out.push(self.flags);
        out.extend_from_slice(&self.body);
        out
    }

    // ── Internal ──────────────────────────────────────────────

    /// Re-serialize the body for `new_flags`, taking each present field
    /// from `overlay` first and from the current body second.
    fn recompile(&mut self, new_flags: u8, overlay: Overlay) -> Result<(), PacketError> {
        let current = self.decode()?;
        let mut body = Vec::with_capacity(self.body.len() + 2 + MAX_PARAM_SIZE);

        if new_flags & FLAG_CLOCK_SYNC != 0 {
            let clock = overlay
                .clock
                .or(current.clock)
                .ok_or(PacketError::MissingField(Field::ClockSync))?;
            body.extend_from_slice(&clock.to_be_bytes());
        }

        if new_flags & FLAG_PARAMETERS != 0 {
            let mut list = match (current.parameters, &overlay.parameter) {
                (None, None) => return Err(PacketError::MissingField(Field::Parameters)),
                (existing, _) => existing.unwrap_or_default(),
            };
            if let Some(parameter) = overlay.parameter {
                upsert(&mut list, parameter)?;
            }
            write_parameters(&mut body, &mut list);
        }

        if new_flags & FLAG_DEVICE_SIGNAL != 0 {
            let devices = overlay
                .devices
                .or(current.devices)
                .ok_or(PacketError::MissingField(Field::DeviceSignal))?;
            body.push(devices);
        }

        self.flags = new_flags;
        self.body = body;
        Ok(())
    }
}

/// Replace the first entry with the same id, or append.
fn upsert(list: &mut Vec<Parameter>, parameter: Parameter) -> Result<(), PacketError> {
    if let Some(slot) = list.iter_mut().find(|p| p.id == parameter.id) {
        *slot = parameter;
        return Ok(());
    }
    if list.len() >= MAX_PARAMETERS {
        return Err(PacketError::ParameterListFull);
    }
    list.push(parameter);
    Ok(())
}

fn write_parameters(body: &mut Vec<u8>, list: &mut [Parameter]) {
    // Stable: entries sharing an id (only possible in parsed foreign
    // packets) keep their relative order.
    list.sort_by_key(|p| p.id);
    body.push(list.len() as u8);
    for p in list.iter() {
        body.push(p.id);
        body.push(p.size());
        body.extend_from_slice(&p.data);
    }
}

/// Decode `body` as laid out by `flags`.  Returns the fields and the number
/// of body bytes consumed.
fn parse_body(flags: u8, body: &[u8]) -> Result<(DecodedPacket, usize), PacketError> {
    let mut cursor = Cursor { buf: body, pos: 0 };
    let mut decoded = DecodedPacket::default();

    if flags & FLAG_CLOCK_SYNC != 0 {
        let raw = cursor.take(4, "clock-sync field truncated")?;
        decoded.clock = Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]));
    }

    if flags & FLAG_PARAMETERS != 0 {
        let count = cursor.byte("parameter count missing")?;
        let mut list = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = cursor.byte("parameter id missing")?;
            let size = cursor.byte("parameter size missing")? as usize;
            if size > MAX_PARAM_SIZE {
                return Err(PacketError::Malformed("parameter payload too large"));
            }
            let raw = cursor.take(size, "parameter payload truncated")?;
            let data = ParamData::from_slice(raw)
                .map_err(|_| PacketError::Malformed("parameter payload too large"))?;
            list.push(Parameter { id, data });
        }
        decoded.parameters = Some(list);
    }

    if flags & FLAG_DEVICE_SIGNAL != 0 {
        decoded.devices = Some(cursor.byte("device mask missing")?);
    }

    Ok((decoded, cursor.pos))
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], PacketError> {
        let end = self.pos + n;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or(PacketError::Malformed(what))?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self, what: &'static str) -> Result<u8, PacketError> {
        self.take(1, what).map(|b| b[0])
    }
}
