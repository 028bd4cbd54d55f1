//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements        | Connects to                 |
//! |-----------------|-------------------|-----------------------------|
//! | `journal`       | ActionLog         | Journal file / I/O channel  |
//! | `json_config`   | ConfigPort        | JSON config file            |
//! | `log_sink`      | EventSink         | `log` facade                |
//! | `memory_store`  | FleetDirectory    | Config roster               |
//! |                 | TelemetryStore    | In-memory latest samples    |
//! | `tcp_transport` | CommandTransport  | House command port (TCP)    |
//! | `time`          | Clock             | System clock                |
//! | `udp_receiver`  | -                 | Telemetry socket (UDP)      |

pub mod journal;
pub mod json_config;
pub mod log_sink;
pub mod memory_store;
pub mod tcp_transport;
pub mod time;
pub mod udp_receiver;
