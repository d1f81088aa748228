//! Guard predicates for controlling level transitions.
//!
//! Guards are pure boolean functions over the health record that decide
//! whether a threshold has been crossed.

use std::fmt;
use std::sync::Arc;

/// Pure predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use tierguard::core::{Guard, ServiceHealthState};
///
/// let five_errors = Guard::new(|s: &ServiceHealthState| s.consecutive_errors >= 5);
///
/// let mut state = ServiceHealthState::new("core-system");
/// assert!(!five_errors.check(&state));
///
/// state.consecutive_errors = 5;
/// assert!(five_errors.check(&state));
/// ```
pub struct Guard<T> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Guard<T> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this value.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}

impl<T> Clone for Guard<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, ServiceHealthState};

    #[test]
    fn guard_checks_counters() {
        let guard = Guard::new(|s: &ServiceHealthState| s.consecutive_healthy >= 20);

        let mut state = ServiceHealthState::new("svc");
        state.consecutive_healthy = 19;
        assert!(!guard.check(&state));

        state.consecutive_healthy = 20;
        assert!(guard.check(&state));
    }

    #[test]
    fn guard_is_deterministic() {
        let state = ServiceHealthState::new("svc");
        let guard = Guard::new(|s: &ServiceHealthState| s.current_level == Level::Full);

        assert_eq!(guard.check(&state), guard.check(&state));
    }

    #[test]
    fn cloned_guard_shares_predicate() {
        let guard = Guard::new(|n: &u32| *n > 3);
        let cloned = guard.clone();

        assert!(cloned.check(&4));
        assert!(!cloned.check(&3));
    }
}
