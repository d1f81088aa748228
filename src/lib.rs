//! Tierguard: a three-level degradation controller
//!
//! Tierguard follows a "pure core, imperative shell" layout. The level state
//! machine is a pure function of `(record, outcome)`; loading and saving the
//! record, classifying requests and writing audit events happen around it.
//!
//! # Core Concepts
//!
//! - **Level**: `1` fully healthy, `2` limited operation, `3` minimal operation
//! - **Health record**: current level plus consecutive error/healthy streaks
//! - **Rules**: 5 errors degrade 1→2, 10 errors degrade 2→3, 10 healthy
//!   outcomes recover 3→2, 20 healthy outcomes recover 2→1
//! - **Store**: a table of records keyed by service id
//!
//! # Example
//!
//! ```rust
//! use tierguard::core::{Level, LevelMachine, Outcome, ServiceHealthState};
//! use tierguard::response;
//!
//! let machine = LevelMachine::standard();
//! let mut state = ServiceHealthState::new("core-system");
//! state.consecutive_errors = 4;
//!
//! let step = machine.step(&state, Outcome::Errored);
//! assert_eq!(step.state.current_level, Level::Limited);
//! assert_eq!(step.state.consecutive_errors, 0);
//!
//! let verdict = response::build(step.state.current_level, step.ok);
//! assert_eq!(verdict.status_code, 500);
//! assert_eq!(verdict.message, "Error at Level 2");
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod handler;
pub mod logging;
pub mod outcome;
pub mod response;
pub mod store;

// Re-export commonly used types
pub use crate::config::ControllerConfig;
pub use crate::core::{Level, LevelMachine, Outcome, ServiceHealthState};
pub use crate::handler::{handle, invoke, HandlerEnv, HandlerError};
pub use crate::outcome::Request;
pub use crate::response::HandlerResponse;
pub use crate::store::{StateStore, StoreError};
