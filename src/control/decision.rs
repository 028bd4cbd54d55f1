//! Demand-response decision engine.
//!
//! Turns one fleet snapshot into at most one device action:
//!
//! | Fleet total                | Mode    | Action                                   |
//! |----------------------------|---------|------------------------------------------|
//! | `total >= max_usage`       | Shed    | warmest active house off                 |
//! | `total <= min_usage`       | Restore | coldest suppressed house on              |
//! | otherwise                  | Band    | swap a warm active house for a freezing  |
//! |                            |         | suppressed one, if worthwhile            |
//!
//! The engine is stateless.  The suppressed set belongs to the caller,
//! which applies the outcome only after the command was delivered.

use std::collections::BTreeSet;

use crate::error::DecisionError;
use crate::fleet::{HouseId, HouseSample};

/// Starting accumulator for both swap searches.  A swap candidate must be
/// warmer than this and a swap priority must be colder.
pub const SWAP_NEUTRAL_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Shed,
    Restore,
    Band,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Switch one house's device on or off.
    Switch { house_id: HouseId, on: bool },
    /// Turn one house off and another on in the same tick.
    Swap { turn_off: HouseId, turn_on: HouseId },
}

impl Action {
    /// `(house, on)` pairs, in the order the commands are issued.
    pub fn commands(self) -> impl Iterator<Item = (HouseId, bool)> {
        let pair = match self {
            Self::Switch { house_id, on } => [Some((house_id, on)), None],
            Self::Swap { turn_off, turn_on } => [Some((turn_off, false)), Some((turn_on, true))],
        };
        pair.into_iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionEngine {
    min_usage: f32,
    max_usage: f32,
}

impl DecisionEngine {
    pub fn new(min_usage: f32, max_usage: f32) -> Self {
        Self {
            min_usage,
            max_usage,
        }
    }

    pub fn thresholds(&self) -> (f32, f32) {
        (self.min_usage, self.max_usage)
    }

    pub fn classify(&self, total: f32) -> Mode {
        if total >= self.max_usage {
            Mode::Shed
        } else if total <= self.min_usage {
            Mode::Restore
        } else {
            Mode::Band
        }
    }

    /// Pick the action for this snapshot.  `Ok(None)` means nothing to do.
    ///
    /// Ties resolve to the first sample in `samples` order.
    pub fn decide(
        &self,
        samples: &[HouseSample],
        suppressed: &BTreeSet<HouseId>,
    ) -> Result<Option<Action>, DecisionError> {
        validate(samples)?;

        let total: f32 = samples.iter().map(|s| s.power_usage).sum();
        let active = move || samples.iter().filter(move |s| !suppressed.contains(&s.house_id));
        let idle = move || samples.iter().filter(move |s| suppressed.contains(&s.house_id));

        let action = match self.classify(total) {
            Mode::Shed => warmest(active(), f32::NEG_INFINITY).map(|s| Action::Switch {
                house_id: s.house_id,
                on: false,
            }),
            Mode::Restore => coldest(idle(), f32::INFINITY).map(|s| Action::Switch {
                house_id: s.house_id,
                on: true,
            }),
            Mode::Band => {
                let fleet_covered = samples.iter().all(|s| suppressed.contains(&s.house_id));
                if suppressed.is_empty() || fleet_covered {
                    return Ok(None);
                }
                let cand = warmest(active(), SWAP_NEUTRAL_TEMPERATURE);
                let prio = coldest(idle(), SWAP_NEUTRAL_TEMPERATURE);
                match (cand, prio) {
                    (Some(c), Some(p)) if c.temperature >= p.temperature => Some(Action::Swap {
                        turn_off: c.house_id,
                        turn_on: p.house_id,
                    }),
                    _ => None,
                }
            }
        };
        Ok(action)
    }
}

fn validate(samples: &[HouseSample]) -> Result<(), DecisionError> {
    let mut seen = BTreeSet::new();
    for s in samples {
        if !s.power_usage.is_finite() || !s.temperature.is_finite() {
            return Err(DecisionError::NonFiniteReading(s.house_id));
        }
        if !seen.insert(s.house_id) {
            return Err(DecisionError::DuplicateHouse(s.house_id));
        }
    }
    Ok(())
}

/// First sample strictly warmer than everything before it and than `floor`.
fn warmest<'a>(
    samples: impl Iterator<Item = &'a HouseSample>,
    floor: f32,
) -> Option<&'a HouseSample> {
    samples
        .fold((floor, None), |(best, pick), s| {
            if s.temperature > best {
                (s.temperature, Some(s))
            } else {
                (best, pick)
            }
        })
        .1
}

/// First sample strictly colder than everything before it and than `ceiling`.
fn coldest<'a>(
    samples: impl Iterator<Item = &'a HouseSample>,
    ceiling: f32,
) -> Option<&'a HouseSample> {
    samples
        .fold((ceiling, None), |(best, pick), s| {
            if s.temperature < best {
                (s.temperature, Some(s))
            } else {
                (best, pick)
            }
        })
        .1
}
