//! Request payload parsing and outcome classification.
//!
//! A request carries an optional body that is either a JSON string or an
//! already-decoded JSON value. Parsing is total: anything that is not a JSON
//! object becomes [`Payload::Malformed`] and is classified as healthy.

use crate::core::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound invocation.
///
/// Deserializes from an event document such as `{"body": "{\"error\":true}"}`
/// or `{"body": {"error": true}}`; a missing or `null` body is `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub body: Option<RequestBody>,
}

impl Request {
    pub fn new(body: Option<RequestBody>) -> Self {
        Self { body }
    }

    /// Request with a raw text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(Some(RequestBody::Text(body.into())))
    }

    /// Request with an already-structured body.
    pub fn json(body: Value) -> Self {
        Self::new(Some(RequestBody::Json(body)))
    }
}

/// Raw request body as delivered by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// UTF-8 text expected to contain a JSON document.
    Text(String),
    /// Body the host already decoded.
    Json(Value),
}

/// Decoded payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Absent,
    /// The body could not be read as a JSON object; carries the reason.
    Malformed(String),
    Structured(Map<String, Value>),
}

impl Payload {
    pub fn from_body(body: Option<&RequestBody>) -> Self {
        match body {
            None => Self::Absent,
            Some(RequestBody::Text(text)) => match serde_json::from_str::<Value>(text) {
                Ok(value) => Self::from_value(value),
                Err(err) => Self::Malformed(err.to_string()),
            },
            Some(RequestBody::Json(value)) => Self::from_value(value.clone()),
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::Structured(fields),
            Value::Null => Self::Absent,
            other => Self::Malformed(format!("expected a JSON object, got {}", kind(&other))),
        }
    }

    /// Whether the payload explicitly asks for an error outcome.
    ///
    /// Only a boolean `true` under `error` counts.
    pub fn requested_error(&self) -> bool {
        match self {
            Self::Structured(fields) => matches!(fields.get("error"), Some(Value::Bool(true))),
            Self::Absent | Self::Malformed(_) => false,
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Classify a payload into the outcome the controller should count.
pub fn classify(payload: &Payload) -> Outcome {
    Outcome::from(!payload.requested_error())
}
