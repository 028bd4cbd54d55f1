//! Timer/scheduler engine.
//!
//! Drives the decision tick and clock synchronisation from the control
//! loop's fixed-period heartbeat.  The scheduler notifies a
//! [`SchedulerDelegate`] when schedules fire; the main loop implements the
//! delegate to call into the controller.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                          │
//! │                                                              │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────┐  │
//! │  │  Decision   │  │ Clock sync  │  │ Clock sync (startup) │  │
//! │  │  Periodic   │  │  Periodic   │  │      One-Shot        │  │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────┬───────────┘  │
//! │         ▼                ▼                    ▼              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │             FleetController.tick()                           │
//! │             FleetController.sync_clocks()                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::app::ports::{Job, SchedulerDelegate};
use crate::config::SystemConfig;
use log::info;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single schedule entry.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label (e.g., "decision").
    pub label: &'static str,
    /// What firing this schedule does.
    pub job: Job,
    /// Type of schedule.
    pub kind: ScheduleKind,
    /// Whether this schedule is currently enabled.
    pub enabled: bool,
}

/// The type of schedule determines how and when it fires.
#[derive(Debug, Clone)]
pub enum ScheduleKind {
    /// Fire every `interval_secs` seconds.
    Periodic { interval_secs: u32 },
    /// Fire once after `delay_secs`, then auto-disable.
    OneShot { delay_secs: u32 },
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
const MAX_SCHEDULES: usize = 4;

pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
    enabled: bool,
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Ticks elapsed since last fire.
    elapsed_ticks: u64,
    /// Whether the schedule has fired (for OneShot).
    fired: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
            enabled: true,
        }
    }

    /// The controller's standard schedules for `config`.
    ///
    /// A `clock_sync_interval_secs` of zero disables both clock-sync
    /// schedules.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut sched = Self::new();
        let sync = config.clock_sync_interval_secs > 0;
        let schedules = [
            Schedule {
                label: "decision",
                job: Job::Decide,
                kind: ScheduleKind::Periodic {
                    interval_secs: config.decision_interval_secs,
                },
                enabled: true,
            },
            Schedule {
                label: "clock-sync",
                job: Job::ClockSync,
                kind: ScheduleKind::Periodic {
                    interval_secs: config.clock_sync_interval_secs,
                },
                enabled: sync,
            },
            Schedule {
                label: "clock-sync-startup",
                job: Job::ClockSync,
                kind: ScheduleKind::OneShot {
                    delay_secs: config.clock_sync_startup_delay_secs,
                },
                enabled: sync,
            },
        ];
        for s in schedules {
            // Three schedules always fit.
            let _ = sched.add(s);
        }
        sched
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        for (i, slot) in self.schedules.iter_mut().enumerate() {
            if slot.is_none() {
                info!("Scheduler: added '{}' at slot {}", schedule.label, i);
                *slot = Some(ScheduleEntry {
                    schedule,
                    elapsed_ticks: 0,
                    fired: false,
                });
                return Some(i);
            }
        }
        None
    }

    /// Enable or disable the entire scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Tick the scheduler.  Call once per control loop tick.
    ///
    /// * `tick_secs`: duration of one tick in seconds.
    /// * `delegate`: receives fire notifications.
    pub fn tick(&mut self, tick_secs: f32, delegate: &mut dyn SchedulerDelegate) {
        if !self.enabled {
            return;
        }

        for slot in self.schedules.iter_mut() {
            let entry = match slot {
                Some(e) if e.schedule.enabled => e,
                _ => continue,
            };

            entry.elapsed_ticks += 1;
            let elapsed_secs = entry.elapsed_ticks as f32 * tick_secs;

            match entry.schedule.kind {
                ScheduleKind::Periodic { interval_secs } => {
                    if elapsed_secs >= interval_secs as f32 {
                        delegate.on_schedule_fired(entry.schedule.label, entry.schedule.job);
                        entry.elapsed_ticks = 0;
                    }
                }

                ScheduleKind::OneShot { delay_secs } => {
                    if !entry.fired && elapsed_secs >= delay_secs as f32 {
                        info!(
                            "Scheduler: '{}' one-shot fired (after {}s)",
                            entry.schedule.label, delay_secs
                        );
                        delegate.on_schedule_fired(entry.schedule.label, entry.schedule.job);
                        entry.fired = true;
                        entry.schedule.enabled = false; // Auto-disable.
                    }
                }
            }
        }
    }

    /// Number of active (enabled) schedules.
    pub fn active_count(&self) -> usize {
        self.schedules
            .iter()
            .filter(|s| s.as_ref().is_some_and(|e| e.schedule.enabled))
            .count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
