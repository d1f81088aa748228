//! Structured audit events.
//!
//! Every completed invocation emits a `REQUEST_RESULT` event, preceded by a
//! `LEVEL_TRANSITION` event when the level changed. Sink failures are
//! reported to the caller, which logs and ignores them.

use crate::core::{Level, StateTransition};
use crate::response::iso8601;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use thiserror::Error;

/// Audit event as written to the log stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    #[serde(rename_all = "camelCase")]
    LevelTransition {
        time: String,
        from: Level,
        to: Level,
    },
    #[serde(rename_all = "camelCase")]
    RequestResult {
        time: String,
        requested_error: bool,
        level: Level,
        consecutive_errors: u32,
        consecutive_healthy: u32,
        status_code: u16,
        message: String,
    },
}

impl AuditEvent {
    pub fn transition(transition: &StateTransition<Level>) -> Self {
        Self::LevelTransition {
            time: iso8601(transition.timestamp),
            from: transition.from,
            to: transition.to,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::LevelTransition { .. } => "LEVEL_TRANSITION",
            Self::RequestResult { .. } => "REQUEST_RESULT",
        }
    }
}

/// Fields of a `REQUEST_RESULT` event, before timestamping.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestResult {
    pub requested_error: bool,
    pub level: Level,
    pub consecutive_errors: u32,
    pub consecutive_healthy: u32,
    pub status_code: u16,
    pub message: String,
}

impl RequestResult {
    pub fn at(self, time: DateTime<Utc>) -> AuditEvent {
        AuditEvent::RequestResult {
            time: iso8601(time),
            requested_error: self.requested_error,
            level: self.level,
            consecutive_errors: self.consecutive_errors,
            consecutive_healthy: self.consecutive_healthy,
            status_code: self.status_code,
            message: self.message,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to encode audit event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write audit event: {0}")]
    Write(#[from] io::Error),
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes each event as one JSON document per line.
pub struct JsonLinesAuditLog<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesAuditLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesAuditLog<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> AuditSink for JsonLinesAuditLog<W> {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut writer = self.writer.lock();
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

/// Emits events through `tracing` under the `tierguard::audit` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditLog;

impl AuditSink for TracingAuditLog {
    fn emit(&self, event: &AuditEvent) -> Result<(), AuditError> {
        match event {
            AuditEvent::LevelTransition { time, from, to } => {
                tracing::info!(
                    target: "tierguard::audit",
                    event_type = event.event_type(),
                    time = %time,
                    from = from.as_u8(),
                    to = to.as_u8(),
                    "level transition"
                );
            }
            AuditEvent::RequestResult {
                time,
                requested_error,
                level,
                consecutive_errors,
                consecutive_healthy,
                status_code,
                message,
            } => {
                tracing::info!(
                    target: "tierguard::audit",
                    event_type = event.event_type(),
                    time = %time,
                    requested_error,
                    level = level.as_u8(),
                    consecutive_errors,
                    consecutive_healthy,
                    status_code,
                    message = %message,
                    "request result"
                );
            }
        }
        Ok(())
    }
}
