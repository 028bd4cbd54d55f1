//! Telemetry datagram decoder.
//!
//! Houses report over UDP with a fixed 13-byte big-endian payload:
//!
//! ```text
//! ┌────────────┬────────────────┬────────────────┬────────────────┐
//! │ state (1B) │ power f32 (4B) │ temp f32 (4B)  │ clock u32 (4B) │
//! └────────────┴────────────────┴────────────────┴────────────────┘
//! ```
//!
//! Bytes past the payload are ignored.

use crate::error::TelemetryError;
use crate::fleet::{HouseId, HouseSample};

pub const TELEMETRY_LEN: usize = 13;

/// One decoded report, not yet attributed to a house.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub device_state: u8,
    pub power_usage: f32,
    pub temperature: f32,
    pub timestamp: u32,
}

impl TelemetryReading {
    pub fn decode(datagram: &[u8]) -> Result<Self, TelemetryError> {
        let raw: &[u8; TELEMETRY_LEN] = datagram
            .get(..TELEMETRY_LEN)
            .and_then(|s| s.try_into().ok())
            .ok_or(TelemetryError::TooShort(datagram.len()))?;

        let power_usage = f32::from_be_bytes([raw[1], raw[2], raw[3], raw[4]]);
        let temperature = f32::from_be_bytes([raw[5], raw[6], raw[7], raw[8]]);
        if !power_usage.is_finite() || !temperature.is_finite() {
            return Err(TelemetryError::NonFinite);
        }

        Ok(Self {
            device_state: raw[0],
            power_usage,
            temperature,
            timestamp: u32::from_be_bytes([raw[9], raw[10], raw[11], raw[12]]),
        })
    }

    pub fn encode(&self) -> [u8; TELEMETRY_LEN] {
        let mut out = [0u8; TELEMETRY_LEN];
        out[0] = self.device_state;
        out[1..5].copy_from_slice(&self.power_usage.to_be_bytes());
        out[5..9].copy_from_slice(&self.temperature.to_be_bytes());
        out[9..13].copy_from_slice(&self.timestamp.to_be_bytes());
        out
    }

    pub fn attribute(self, house_id: HouseId) -> HouseSample {
        HouseSample {
            house_id,
            device_state: self.device_state,
            power_usage: self.power_usage,
            temperature: self.temperature,
            timestamp: self.timestamp,
        }
    }
}
