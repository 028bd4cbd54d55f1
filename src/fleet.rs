//! Fleet data model shared by the engine, the controller and the adapters.

use core::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Directory id of a household sub-controller.
pub type HouseId = u32;

/// Maximum house name length (bytes), matching the roster schema.
pub const MAX_NAME_LEN: usize = 30;

/// Device line driven by the controller ("device 1").
pub const DEVICE_1: u8 = 0b0000_0001;

/// One household sub-controller as listed in the fleet directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    pub id: HouseId,
    pub name: heapless::String<MAX_NAME_LEN>,
    pub address: IpAddr,
}

/// A telemetry sample attributed to a house.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseSample {
    pub house_id: HouseId,
    /// Raw device state byte reported by the house.
    pub device_state: u8,
    /// Instantaneous power draw (kW).
    pub power_usage: f32,
    /// Indoor temperature (°C).
    pub temperature: f32,
    /// House clock (Unix seconds).
    pub timestamp: u32,
}

/// Audit entry for one delivered device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Issue time (Unix seconds).
    pub timestamp: u32,
    pub device_id: u8,
    /// `true` = switched on, `false` = switched off.
    pub state_change: bool,
    pub house_id: HouseId,
}
