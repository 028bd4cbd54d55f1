//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, one tagged line per event.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::control::Action;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                houses,
                min_usage,
                max_usage,
            } => {
                info!(
                    "START | houses={} | band={:.2}..{:.2}kW",
                    houses, min_usage, max_usage
                );
            }
            AppEvent::SampleRecorded(s) => {
                debug!(
                    "TELEM | house={} | state=0b{:08b} | P={:.2}kW | T={:.1}\u{00b0}C | clk={}",
                    s.house_id, s.device_state, s.power_usage, s.temperature, s.timestamp
                );
            }
            AppEvent::UnknownSender(addr) => {
                warn!("TELEM | dropped datagram from unknown sender {}", addr);
            }
            AppEvent::Decided {
                total_kw,
                mode,
                action,
            } => match action {
                Some(Action::Switch { house_id, on }) => info!(
                    "DECIDE | total={:.2}kW | {:?} | house {} {}",
                    total_kw,
                    mode,
                    house_id,
                    if *on { "ON" } else { "OFF" }
                ),
                Some(Action::Swap { turn_off, turn_on }) => info!(
                    "DECIDE | total={:.2}kW | {:?} | swap off={} on={}",
                    total_kw, mode, turn_off, turn_on
                ),
                None => debug!("DECIDE | total={:.2}kW | {:?} | no action", total_kw, mode),
            },
            AppEvent::DecisionRejected(e) => {
                warn!("DECIDE | snapshot rejected: {}", e);
            }
            AppEvent::CommandDelivered { house_id, on } => {
                info!(
                    "CMD | house={} | device1 {} | delivered",
                    house_id,
                    if *on { "ON" } else { "OFF" }
                );
            }
            AppEvent::CommandFailed {
                house_id,
                on,
                error,
            } => {
                warn!(
                    "CMD | house={} | device1 {} | failed: {}",
                    house_id,
                    if *on { "ON" } else { "OFF" },
                    error
                );
            }
            AppEvent::ClockSynced {
                value,
                delivered,
                failed,
            } => {
                info!(
                    "CLOCK | set to {} | delivered={} failed={}",
                    value, delivered, failed
                );
            }
        }
    }
}
