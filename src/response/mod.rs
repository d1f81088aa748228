//! User-facing responses.

use crate::core::Level;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Status returned when the controller itself cannot run.
pub const UNAVAILABLE_STATUS: u16 = 503;
pub const UNAVAILABLE_MESSAGE: &str = "Degradation controller unavailable, try later";

/// Status code and message for a (level, outcome) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub status_code: u16,
    pub message: &'static str,
}

/// Look up the verdict for `level` and whether the request was healthy.
pub fn build(level: Level, ok: bool) -> Verdict {
    let (status_code, message) = match (level, ok) {
        (Level::Full, true) => (200, "Level 1: OK"),
        (Level::Full, false) => (500, "Error at Level 1"),
        (Level::Limited, true) => (200, "Level 2: Limited Operation"),
        (Level::Limited, false) => (500, "Error at Level 2"),
        (Level::Minimal, true) => (200, "Level 3: Minimal Operation"),
        (Level::Minimal, false) => (500, "Level 3: System under maintenance, try later"),
    };
    Verdict {
        status_code,
        message,
    }
}

/// JSON document carried in [`HandlerResponse::body`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    pub message: String,
}

/// Response handed back to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn from_verdict(verdict: Verdict, level: Level, time: DateTime<Utc>) -> Self {
        Self::with_body(
            verdict.status_code,
            ResponseBody {
                time: iso8601(time),
                level: Some(level),
                message: verdict.message.to_string(),
            },
        )
    }

    pub fn unavailable(time: DateTime<Utc>) -> Self {
        Self::with_body(
            UNAVAILABLE_STATUS,
            ResponseBody {
                time: iso8601(time),
                level: None,
                message: UNAVAILABLE_MESSAGE.to_string(),
            },
        )
    }

    fn with_body(status_code: u16, body: ResponseBody) -> Self {
        // ResponseBody holds only strings and integers.
        let body = serde_json::to_string(&body).unwrap_or_default();
        Self { status_code, body }
    }

    /// Decode the body back into its document form.
    pub fn parsed_body(&self) -> serde_json::Result<ResponseBody> {
        serde_json::from_str(&self.body)
    }
}

/// RFC 3339 timestamp with millisecond precision and a `Z` suffix.
pub fn iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
