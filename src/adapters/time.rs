//! System clock adapter.
//!
//! Wall-clock time for action records.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    /// Saturates at `u32::MAX`; a clock before the epoch reads as 0.
    fn unix_now(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }
}
