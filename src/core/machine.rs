//! The level state machine.
//!
//! Each step counts the outcome, then runs the degradation phase, then the
//! recovery phase. Inside a phase the first rule that fires wins; the two
//! phases are evaluated independently on the same record.

use super::level::{
    Level, Outcome, ServiceHealthState, ERRORS_TO_LIMITED, ERRORS_TO_MINIMAL, HEALTHY_TO_FULL,
    HEALTHY_TO_LIMITED,
};
use super::transition::{LevelRule, StateTransition};
use chrono::{DateTime, Utc};

/// Result of running one outcome through the machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Record after counting and any threshold transition.
    pub state: ServiceHealthState,
    /// Level read before the step.
    pub previous_level: Level,
    /// Whether the outcome was healthy.
    pub ok: bool,
}

impl Step {
    /// Whether the level differs from the one read at the start.
    pub fn level_changed(&self) -> bool {
        self.previous_level != self.state.current_level
    }

    /// Transition record for this step, if the level changed.
    pub fn transition_at(&self, timestamp: DateTime<Utc>) -> Option<StateTransition<Level>> {
        self.level_changed().then(|| StateTransition {
            from: self.previous_level,
            to: self.state.current_level,
            timestamp,
        })
    }
}

/// Rule set for the degradation controller.
#[derive(Clone, Debug)]
pub struct LevelMachine {
    degradation: Vec<LevelRule>,
    recovery: Vec<LevelRule>,
}

impl LevelMachine {
    pub fn new(degradation: Vec<LevelRule>, recovery: Vec<LevelRule>) -> Self {
        Self {
            degradation,
            recovery,
        }
    }

    /// The fixed production thresholds: 5 and 10 errors to degrade, 10 and
    /// 20 healthy outcomes to recover.
    pub fn standard() -> Self {
        Self::new(
            vec![
                LevelRule::on_errors(Level::Full, Level::Limited, ERRORS_TO_LIMITED),
                LevelRule::on_errors(Level::Limited, Level::Minimal, ERRORS_TO_MINIMAL),
            ],
            vec![
                LevelRule::on_healthy(Level::Minimal, Level::Limited, HEALTHY_TO_LIMITED),
                LevelRule::on_healthy(Level::Limited, Level::Full, HEALTHY_TO_FULL),
            ],
        )
    }

    /// Apply one outcome to `state` (pure).
    pub fn step(&self, state: &ServiceHealthState, outcome: Outcome) -> Step {
        let previous_level = state.current_level;
        let mut next = state.clone();

        next.count(outcome);
        Self::apply_phase(&self.degradation, &mut next);
        Self::apply_phase(&self.recovery, &mut next);

        Step {
            state: next,
            previous_level,
            ok: outcome.is_healthy(),
        }
    }

    fn apply_phase(rules: &[LevelRule], state: &mut ServiceHealthState) {
        if let Some(rule) = rules.iter().find(|r| r.can_fire(state)) {
            state.enter(rule.to);
        }
    }
}

impl Default for LevelMachine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Advance `state` by one outcome under the standard thresholds.
///
/// Returns the new record and `ok`, which equals `healthy`.
pub fn advance(state: &ServiceHealthState, healthy: bool) -> (ServiceHealthState, bool) {
    let step = LevelMachine::standard().step(state, Outcome::from(healthy));
    (step.state, step.ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(level: Level, errors: u32, healthy: u32) -> ServiceHealthState {
        ServiceHealthState {
            service_id: "svc".to_string(),
            current_level: level,
            consecutive_errors: errors,
            consecutive_healthy: healthy,
        }
    }

    fn run(mut state: ServiceHealthState, outcome: Outcome, times: usize) -> ServiceHealthState {
        let machine = LevelMachine::standard();
        for _ in 0..times {
            state = machine.step(&state, outcome).state;
        }
        state
    }

    #[test]
    fn four_errors_do_not_degrade() {
        let state = run(ServiceHealthState::new("svc"), Outcome::Errored, 4);
        assert_eq!(state, at(Level::Full, 4, 0));
    }

    #[test]
    fn fifth_error_degrades_to_limited() {
        let state = run(ServiceHealthState::new("svc"), Outcome::Errored, 5);
        assert_eq!(state, at(Level::Limited, 0, 0));
    }

    #[test]
    fn ten_errors_at_limited_degrade_to_minimal() {
        let nine = run(at(Level::Limited, 0, 0), Outcome::Errored, 9);
        assert_eq!(nine, at(Level::Limited, 9, 0));

        let ten = run(at(Level::Limited, 0, 0), Outcome::Errored, 10);
        assert_eq!(ten, at(Level::Minimal, 0, 0));
    }

    #[test]
    fn errors_at_minimal_keep_counting() {
        let state = run(at(Level::Minimal, 0, 0), Outcome::Errored, 25);
        assert_eq!(state, at(Level::Minimal, 25, 0));
    }

    #[test]
    fn ten_healthy_at_minimal_recover_to_limited() {
        let state = run(at(Level::Minimal, 0, 0), Outcome::Healthy, 10);
        assert_eq!(state, at(Level::Limited, 0, 0));
    }

    #[test]
    fn twenty_healthy_at_limited_recover_to_full() {
        let nineteen = run(at(Level::Limited, 0, 0), Outcome::Healthy, 19);
        assert_eq!(nineteen, at(Level::Limited, 0, 19));

        let twenty = run(at(Level::Limited, 0, 0), Outcome::Healthy, 20);
        assert_eq!(twenty, at(Level::Full, 0, 0));
    }

    #[test]
    fn healthy_at_full_keeps_counting() {
        let state = run(ServiceHealthState::new("svc"), Outcome::Healthy, 30);
        assert_eq!(state, at(Level::Full, 0, 30));
    }

    #[test]
    fn single_error_breaks_healthy_streak() {
        let step = LevelMachine::standard().step(&at(Level::Full, 0, 7), Outcome::Errored);
        assert_eq!(step.state, at(Level::Full, 1, 0));
        assert!(!step.ok);
        assert!(!step.level_changed());
    }

    #[test]
    fn step_reports_transition() {
        let step = LevelMachine::standard().step(&at(Level::Full, 4, 0), Outcome::Errored);
        let now = Utc::now();
        let transition = step.transition_at(now).unwrap();

        assert_eq!(transition.from, Level::Full);
        assert_eq!(transition.to, Level::Limited);
        assert_eq!(transition.timestamp, now);
    }

    #[test]
    fn stale_counters_past_threshold_fire_on_next_step() {
        // A record written with counters beyond the threshold still degrades.
        let step = LevelMachine::standard().step(&at(Level::Full, 12, 0), Outcome::Errored);
        assert_eq!(step.state, at(Level::Limited, 0, 0));
    }

    #[test]
    fn degradation_runs_before_recovery_in_one_step() {
        // Custom rules where degrading lands on a level whose recovery
        // threshold is zero: both phases fire in one step.
        let machine = LevelMachine::new(
            vec![LevelRule::on_errors(Level::Full, Level::Limited, 1)],
            vec![LevelRule::on_healthy(Level::Limited, Level::Full, 0)],
        );
        let step = machine.step(&ServiceHealthState::new("svc"), Outcome::Errored);

        assert_eq!(step.state.current_level, Level::Full);
        assert!(!step.level_changed());
    }

    #[test]
    fn advance_matches_machine() {
        let (state, ok) = advance(&at(Level::Full, 4, 0), false);
        assert_eq!(state, at(Level::Limited, 0, 0));
        assert!(!ok);

        let (state, ok) = advance(&ServiceHealthState::new("svc"), true);
        assert_eq!(state, at(Level::Full, 0, 1));
        assert!(ok);
    }
}
