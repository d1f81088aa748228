//! Per-request orchestration.
//!
//! One invocation parses the payload, classifies it, loads the health
//! record, steps the level machine, persists the new record and emits audit
//! events, in that order. The work is expressed as a stillwater effect over
//! a [`HandlerEnv`], so tests run it against in-memory collaborators.
//!
//! Audit events are only emitted once the new record is persisted. When the
//! save fails the computed level change is reported as an error log and the
//! caller gets the controller-unavailable response.

mod error;

pub use error::HandlerError;

use crate::audit::{AuditEvent, AuditSink, JsonLinesAuditLog, RequestResult, TracingAuditLog};
use crate::config::{AuditFormat, ControllerConfig};
use crate::core::{Level, LevelMachine, ServiceHealthState, StateTransition};
use crate::outcome::{classify, Payload, Request};
use crate::response::{self, HandlerResponse};
use crate::store::{JsonFileStore, StateStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use stillwater::effect::Effect;
use stillwater::prelude::*;

/// Collaborators shared by every invocation.
#[derive(Clone)]
pub struct HandlerEnv {
    pub config: Arc<ControllerConfig>,
    pub store: Arc<dyn StateStore>,
    pub audit: Arc<dyn AuditSink>,
    pub machine: Arc<LevelMachine>,
}

impl HandlerEnv {
    pub fn new(
        config: ControllerConfig,
        store: Arc<dyn StateStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            audit,
            machine: Arc::new(LevelMachine::standard()),
        }
    }

    /// File-backed store under `state_dir`, audit sink per `audit_format`.
    pub fn from_config(config: ControllerConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.state_dir, &config.table_name));
        let audit: Arc<dyn AuditSink> = match config.audit_format {
            AuditFormat::Json => Arc::new(JsonLinesAuditLog::stdout()),
            AuditFormat::Tracing => Arc::new(TracingAuditLog),
        };
        Self::new(config, store, audit)
    }

    pub fn with_machine(mut self, machine: LevelMachine) -> Self {
        self.machine = Arc::new(machine);
        self
    }
}

/// Everything a successful invocation produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub requested_error: bool,
    /// Record as persisted.
    pub state: ServiceHealthState,
    pub transition: Option<StateTransition<Level>>,
    pub response: HandlerResponse,
}

/// Build the effect for one invocation at time `now`.
pub fn invoke(
    request: Request,
    now: DateTime<Utc>,
) -> impl Effect<Output = Invocation, Error = HandlerError, Env = HandlerEnv> {
    from_fn(move |env: &HandlerEnv| run(env, &request, now))
}

/// Run one invocation and turn any failure into the unavailable response.
pub async fn handle(env: &HandlerEnv, request: Request) -> HandlerResponse {
    let now = Utc::now();
    match invoke(request, now).run(env).await {
        Ok(invocation) => invocation.response,
        Err(err) => {
            tracing::error!(
                service_id = %env.config.service_id,
                table = %env.store.table(),
                error = %err,
                "degradation controller unavailable"
            );
            HandlerResponse::unavailable(now)
        }
    }
}

fn run(env: &HandlerEnv, request: &Request, now: DateTime<Utc>) -> Result<Invocation, HandlerError> {
    let payload = Payload::from_body(request.body.as_ref());
    if let Payload::Malformed(reason) = &payload {
        tracing::debug!(reason = %reason, "request body ignored, counting as healthy");
    }
    let requested_error = payload.requested_error();
    let outcome = classify(&payload);

    let state = env
        .store
        .load(&env.config.service_id)
        .map_err(HandlerError::Load)?;

    let step = env.machine.step(&state, outcome);
    let verdict = response::build(step.state.current_level, step.ok);

    env.store
        .save(&step.state)
        .map_err(|source| HandlerError::Persist {
            from: step.previous_level,
            computed: step.state.current_level,
            source,
        })?;

    let transition = step.transition_at(now);
    if let Some(transition) = &transition {
        tracing::info!(
            service_id = %step.state.service_id,
            from = transition.from.as_u8(),
            to = transition.to.as_u8(),
            degradation = transition.is_degradation(),
            "service level changed"
        );
        emit(env, &AuditEvent::transition(transition));
    }

    let result = RequestResult {
        requested_error,
        level: step.state.current_level,
        consecutive_errors: step.state.consecutive_errors,
        consecutive_healthy: step.state.consecutive_healthy,
        status_code: verdict.status_code,
        message: verdict.message.to_string(),
    };
    emit(env, &result.at(now));

    Ok(Invocation {
        requested_error,
        response: HandlerResponse::from_verdict(verdict, step.state.current_level, now),
        state: step.state,
        transition,
    })
}

fn emit(env: &HandlerEnv, event: &AuditEvent) {
    if let Err(err) = env.audit.emit(event) {
        tracing::warn!(
            event_type = event.event_type(),
            error = %err,
            "failed to emit audit event"
        );
    }
}
