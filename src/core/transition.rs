//! Level transition rules and transition records.

use super::guard::Guard;
use super::level::{Level, ServiceHealthState};
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use tierguard::core::{Level, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Level::Full,
///     to: Level::Limited,
///     timestamp: Utc::now(),
/// };
/// assert!(transition.is_degradation());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

impl StateTransition<Level> {
    pub fn is_degradation(&self) -> bool {
        self.to.as_u8() > self.from.as_u8()
    }

    pub fn is_recovery(&self) -> bool {
        self.to.as_u8() < self.from.as_u8()
    }
}

/// A threshold rule moving a service from one level to another.
///
/// The rule fires when the record is at `from` and the guard holds on the
/// already-counted record.
#[derive(Clone, Debug)]
pub struct LevelRule {
    pub from: Level,
    pub to: Level,
    pub guard: Guard<ServiceHealthState>,
}

impl LevelRule {
    pub fn new<F>(from: Level, to: Level, predicate: F) -> Self
    where
        F: Fn(&ServiceHealthState) -> bool + Send + Sync + 'static,
    {
        Self {
            from,
            to,
            guard: Guard::new(predicate),
        }
    }

    /// Degrade from `from` to `to` once the error streak reaches `threshold`.
    pub fn on_errors(from: Level, to: Level, threshold: u32) -> Self {
        Self::new(from, to, move |s| s.consecutive_errors >= threshold)
    }

    /// Recover from `from` to `to` once the healthy streak reaches `threshold`.
    pub fn on_healthy(from: Level, to: Level, threshold: u32) -> Self {
        Self::new(from, to, move |s| s.consecutive_healthy >= threshold)
    }

    /// Check if this rule fires for the given record (pure).
    pub fn can_fire(&self, state: &ServiceHealthState) -> bool {
        state.current_level == self.from && self.guard.check(state)
    }
}
