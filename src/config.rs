//! System configuration parameters
//!
//! All tunable parameters for the edge controller.  Loaded from a JSON
//! file by [`JsonConfigFile`](crate::adapters::json_config::JsonConfigFile);
//! any field missing from the file takes its default.

use std::collections::BTreeSet;

use core::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::fleet::{House, HouseId, MAX_NAME_LEN};
use crate::protocol::{ParamType, ParamValue, ParameterOracle, ParameterSpec};

/// One roster entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseConfig {
    pub id: HouseId,
    pub name: String,
    pub address: IpAddr,
}

/// A parameter value pushed to every house at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssignment {
    pub name: String,
    pub value: ParamValue,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Demand response ---
    /// Fleet total (kW) at or below which suppressed houses are restored
    pub min_usage: f32,
    /// Fleet total (kW) at or above which a house is shed
    pub max_usage: f32,

    // --- Network ---
    /// UDP port telemetry datagrams arrive on
    pub telemetry_port: u16,
    /// TCP port every house listens on for control packets
    pub command_port: u16,
    /// Connect and write timeout per command (milliseconds)
    pub send_timeout_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Decision tick interval (seconds)
    pub decision_interval_secs: u32,
    /// Clock sync interval (seconds), 0 = disabled
    pub clock_sync_interval_secs: u32,
    /// Delay before the first clock sync after startup (seconds)
    pub clock_sync_startup_delay_secs: u32,
    /// Seconds added to the newest house clock when syncing
    pub clock_lead_secs: u32,

    // --- Persistence ---
    /// Action journal file; `None` keeps records only in the log
    pub journal_path: Option<String>,

    // --- Protocol ---
    /// Declared control parameters (name, id, type)
    pub parameters: Vec<ParameterSpec>,
    /// Parameters pushed to the whole fleet at startup
    pub parameter_assignments: Vec<ParameterAssignment>,

    // --- Fleet ---
    pub houses: Vec<HouseConfig>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            min_usage: 5.0,
            max_usage: 10.0,

            telemetry_port: 42070,
            command_port: 42069,
            send_timeout_ms: 500,

            control_loop_interval_ms: 1000, // 1 Hz
            decision_interval_secs: 1,
            clock_sync_interval_secs: 60, // 1/min
            clock_sync_startup_delay_secs: 5,
            clock_lead_secs: 60,

            journal_path: None,

            parameters: vec![
                ParameterSpec {
                    name: "heater_enabled".into(),
                    id: 1,
                    kind: ParamType::Bool,
                },
                ParameterSpec {
                    name: "report_interval".into(),
                    id: 2,
                    kind: ParamType::Int,
                },
                ParameterSpec {
                    name: "target_temperature".into(),
                    id: 3,
                    kind: ParamType::Float,
                },
            ],
            parameter_assignments: Vec::new(),

            houses: (1..=3)
                .map(|n| HouseConfig {
                    id: n,
                    name: format!("House {n}"),
                    address: IpAddr::V4(Ipv4Addr::new(10, 10, 0, 100 + n as u8)),
                })
                .collect(),
        }
    }
}

impl SystemConfig {
    /// Control loop period in seconds.
    pub fn tick_secs(&self) -> f32 {
        self.control_loop_interval_ms as f32 / 1000.0
    }

    /// The roster as domain [`House`]s.  Call after [`validate_config`].
    pub fn roster(&self) -> Result<Vec<House>, ConfigError> {
        self.houses
            .iter()
            .map(|h| {
                let name = heapless::String::try_from(h.name.as_str()).map_err(|_| {
                    ConfigError::ValidationFailed("house name must be at most 30 bytes")
                })?;
                Ok(House {
                    id: h.id,
                    name,
                    address: h.address,
                })
            })
            .collect()
    }
}

/// Reject configurations the controller cannot run with.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !cfg.min_usage.is_finite() || cfg.min_usage < 0.0 {
        return Err(ConfigError::ValidationFailed(
            "min_usage must be a finite, non-negative number",
        ));
    }
    if !cfg.max_usage.is_finite() || cfg.max_usage < 0.0 {
        return Err(ConfigError::ValidationFailed(
            "max_usage must be a finite, non-negative number",
        ));
    }
    if cfg.min_usage >= cfg.max_usage {
        return Err(ConfigError::ValidationFailed(
            "min_usage must be < max_usage",
        ));
    }
    if cfg.telemetry_port == 0 || cfg.command_port == 0 {
        return Err(ConfigError::ValidationFailed("ports must be non-zero"));
    }
    if cfg.send_timeout_ms == 0 {
        return Err(ConfigError::ValidationFailed("send_timeout_ms must be > 0"));
    }
    if cfg.control_loop_interval_ms == 0 {
        return Err(ConfigError::ValidationFailed(
            "control_loop_interval_ms must be > 0",
        ));
    }
    if cfg.decision_interval_secs == 0 {
        return Err(ConfigError::ValidationFailed(
            "decision_interval_secs must be > 0",
        ));
    }

    let mut ids = BTreeSet::new();
    let mut names = BTreeSet::new();
    for p in &cfg.parameters {
        if p.name.is_empty() {
            return Err(ConfigError::ValidationFailed("parameter name must not be empty"));
        }
        if !ids.insert(p.id) {
            return Err(ConfigError::ValidationFailed("duplicate parameter id"));
        }
        if !names.insert(p.name.as_str()) {
            return Err(ConfigError::ValidationFailed("duplicate parameter name"));
        }
    }

    let oracle = ParameterOracle::new(cfg.parameters.iter().cloned());
    for a in &cfg.parameter_assignments {
        if oracle.encode(a.name.as_str().into(), a.value).is_err() {
            return Err(ConfigError::ValidationFailed(
                "parameter assignment names an unknown parameter or has the wrong type",
            ));
        }
    }

    let mut house_ids = BTreeSet::new();
    let mut addresses = BTreeSet::new();
    for h in &cfg.houses {
        if h.name.is_empty() {
            return Err(ConfigError::ValidationFailed("house name must not be empty"));
        }
        if h.name.len() > MAX_NAME_LEN {
            return Err(ConfigError::ValidationFailed(
                "house name must be at most 30 bytes",
            ));
        }
        if !house_ids.insert(h.id) {
            return Err(ConfigError::ValidationFailed("duplicate house id"));
        }
        if !addresses.insert(h.address) {
            return Err(ConfigError::ValidationFailed("duplicate house address"));
        }
    }
    Ok(())
}
