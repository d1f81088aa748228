//! Core controller types and logic.
//!
//! This module contains the pure functional core of the controller:
//! - Operating levels and the per-service health record
//! - Guard predicates and threshold rules
//! - The level state machine
//!
//! Nothing in this module performs I/O.

mod guard;
mod level;
mod machine;
mod state;
mod transition;

pub use guard::Guard;
pub use level::{
    Level, Outcome, ServiceHealthState, ERRORS_TO_LIMITED, ERRORS_TO_MINIMAL, HEALTHY_TO_FULL,
    HEALTHY_TO_LIMITED,
};
pub use machine::{advance, LevelMachine, Step};
pub use state::State;
pub use transition::{LevelRule, StateTransition};
