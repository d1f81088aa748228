//! Operating levels and the per-service health record.

use super::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consecutive errors at level 1 that degrade the service to level 2.
pub const ERRORS_TO_LIMITED: u32 = 5;
/// Consecutive errors at level 2 that degrade the service to level 3.
pub const ERRORS_TO_MINIMAL: u32 = 10;
/// Consecutive healthy outcomes at level 3 that recover the service to level 2.
pub const HEALTHY_TO_LIMITED: u32 = 10;
/// Consecutive healthy outcomes at level 2 that recover the service to level 1.
pub const HEALTHY_TO_FULL: u32 = 20;

/// Operating level of a service. Higher is more degraded.
///
/// Serialized as its numeric value (`1`, `2` or `3`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Level 1: fully healthy.
    #[default]
    Full,
    /// Level 2: degraded, limited operation.
    Limited,
    /// Level 3: minimal operation / maintenance.
    Minimal,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Full, Level::Limited, Level::Minimal];

    /// Numeric value as persisted and reported.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Full => 1,
            Self::Limited => 2,
            Self::Minimal => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Full),
            2 => Some(Self::Limited),
            3 => Some(Self::Minimal),
            _ => None,
        }
    }
}

impl State for Level {
    fn name(&self) -> &str {
        match self {
            Self::Full => "Full",
            Self::Limited => "Limited",
            Self::Minimal => "Minimal",
        }
    }

    fn is_error(&self) -> bool {
        matches!(self, Self::Minimal)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::from_u8(value).ok_or_else(|| format!("invalid level {value}, expected 1, 2 or 3"))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Outcome of the request being judged.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Healthy,
    Errored,
}

impl Outcome {
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl From<bool> for Outcome {
    /// `true` means healthy.
    fn from(healthy: bool) -> Self {
        if healthy {
            Self::Healthy
        } else {
            Self::Errored
        }
    }
}

/// Persisted health record for one service identifier.
///
/// At most one of the two streak counters is non-zero, and both are zero
/// right after a level change.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthState {
    pub service_id: String,
    pub current_level: Level,
    pub consecutive_errors: u32,
    pub consecutive_healthy: u32,
}

impl ServiceHealthState {
    /// Initial state for a service seen for the first time.
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            current_level: Level::Full,
            consecutive_errors: 0,
            consecutive_healthy: 0,
        }
    }

    /// Count one outcome, clearing the opposite streak.
    pub fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Healthy => {
                self.consecutive_healthy = self.consecutive_healthy.saturating_add(1);
                self.consecutive_errors = 0;
            }
            Outcome::Errored => {
                self.consecutive_errors = self.consecutive_errors.saturating_add(1);
                self.consecutive_healthy = 0;
            }
        }
    }

    /// Move to `level` and reset both streaks.
    pub fn enter(&mut self, level: Level) {
        self.current_level = level;
        self.consecutive_errors = 0;
        self.consecutive_healthy = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Level::Limited).unwrap(), "2");
        let level: Level = serde_json::from_str("3").unwrap();
        assert_eq!(level, Level::Minimal);
    }

    #[test]
    fn level_rejects_out_of_range_values() {
        assert!(serde_json::from_str::<Level>("0").is_err());
        assert!(serde_json::from_str::<Level>("4").is_err());
    }

    #[test]
    fn only_minimal_is_an_error_level() {
        assert!(!Level::Full.is_error());
        assert!(!Level::Limited.is_error());
        assert!(Level::Minimal.is_error());
        assert!(Level::ALL.iter().all(|l| !l.is_final()));
    }

    #[test]
    fn new_state_has_defaults() {
        let state = ServiceHealthState::new("core-system");
        assert_eq!(state.current_level, Level::Full);
        assert_eq!(state.consecutive_errors, 0);
        assert_eq!(state.consecutive_healthy, 0);
    }

    #[test]
    fn count_resets_opposite_streak() {
        let mut state = ServiceHealthState::new("svc");
        state.count(Outcome::Healthy);
        state.count(Outcome::Healthy);
        state.count(Outcome::Errored);
        assert_eq!(state.consecutive_errors, 1);
        assert_eq!(state.consecutive_healthy, 0);
    }

    #[test]
    fn count_saturates() {
        let mut state = ServiceHealthState::new("svc");
        state.consecutive_errors = u32::MAX;
        state.count(Outcome::Errored);
        assert_eq!(state.consecutive_errors, u32::MAX);
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let state = ServiceHealthState::new("core-system");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "serviceId": "core-system",
                "currentLevel": 1,
                "consecutiveErrors": 0,
                "consecutiveHealthy": 0,
            })
        );
    }
}
