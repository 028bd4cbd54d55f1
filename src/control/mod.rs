//! Fleet power control.

pub mod decision;

pub use decision::{Action, DecisionEngine, Mode};
