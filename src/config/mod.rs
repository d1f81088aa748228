//! Controller configuration.
//!
//! Settings come from environment variables layered over defaults:
//!
//! | variable       | default         |
//! |----------------|-----------------|
//! | `TABLE_NAME`   | `system_state`  |
//! | `SERVICE_ID`   | `core-system`   |
//! | `STATE_DIR`    | `state`         |
//! | `AUDIT_FORMAT` | `json`          |
//! | `LOG_FORMAT`   | `pretty`        |
//!
//! Validation collects every problem instead of stopping at the first one.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "system_state";
pub const DEFAULT_SERVICE_ID: &str = "core-system";
pub const DEFAULT_STATE_DIR: &str = "state";

/// How audit events are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuditFormat {
    /// One JSON document per line on stdout.
    #[default]
    Json,
    /// Structured `tracing` events.
    Tracing,
}

/// How diagnostic logs are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    pub table_name: String,
    pub service_id: String,
    pub state_dir: PathBuf,
    pub audit_format: AuditFormat,
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            service_id: DEFAULT_SERVICE_ID.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            audit_format: AuditFormat::default(),
            log_format: LogFormat::default(),
        }
    }
}

/// A single configuration problem.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("TABLE_NAME must be 3 to 255 characters (got {len})")]
    TableNameLength { len: usize },

    #[error("TABLE_NAME may only contain letters, digits, '_', '-' and '.' (got {name:?})")]
    TableNameCharacters { name: String },

    #[error("{field} must be one of {expected} (got {value:?})")]
    UnknownVariant {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {}", Violations(.0))]
    Invalid(Vec<ConfigViolation>),
}

struct Violations<'a>(&'a [ConfigViolation]);

impl fmt::Display for Violations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

// Shape read from the environment before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    table_name: String,
    service_id: String,
    state_dir: String,
    audit_format: String,
    log_format: String,
}

impl ControllerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(::config::Environment::default())
    }

    /// Load from an explicit variable map, as if it were the environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(::config::Environment::default().source(Some(vars)))
    }

    fn load(environment: ::config::Environment) -> Result<Self, ConfigError> {
        let raw: RawConfig = ::config::Config::builder()
            .set_default("table_name", DEFAULT_TABLE_NAME)?
            .set_default("service_id", DEFAULT_SERVICE_ID)?
            .set_default("state_dir", DEFAULT_STATE_DIR)?
            .set_default("audit_format", "json")?
            .set_default("log_format", "pretty")?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let audit_format = match raw.audit_format.to_ascii_lowercase().as_str() {
            "json" => Some(AuditFormat::Json),
            "tracing" => Some(AuditFormat::Tracing),
            _ => None,
        };
        let log_format = match raw.log_format.to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        };

        let checks = vec![
            check_table_name(&raw.table_name),
            check_non_empty("SERVICE_ID", &raw.service_id),
            check_non_empty("STATE_DIR", &raw.state_dir),
            check_known("AUDIT_FORMAT", "json, tracing", &raw.audit_format, audit_format),
            check_known("LOG_FORMAT", "pretty, json", &raw.log_format, log_format),
        ];

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(()) => Ok(Self {
                table_name: raw.table_name,
                service_id: raw.service_id,
                state_dir: PathBuf::from(raw.state_dir),
                audit_format: audit_format.unwrap_or_default(),
                log_format: log_format.unwrap_or_default(),
            }),
            Validation::Failure(errors) => {
                Err(ConfigError::Invalid(errors.iter().cloned().collect()))
            }
        }
    }
}

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

fn check_non_empty(field: &'static str, value: &str) -> Check {
    if value.trim().is_empty() {
        Validation::fail(ConfigViolation::Empty { field })
    } else {
        Validation::success(())
    }
}

fn check_table_name(name: &str) -> Check {
    if name.is_empty() {
        return Validation::fail(ConfigViolation::Empty {
            field: "TABLE_NAME",
        });
    }
    let len = name.chars().count();
    if !(3..=255).contains(&len) {
        return Validation::fail(ConfigViolation::TableNameLength { len });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Validation::fail(ConfigViolation::TableNameCharacters {
            name: name.to_string(),
        });
    }
    Validation::success(())
}

fn check_known<T>(
    field: &'static str,
    expected: &'static str,
    value: &str,
    parsed: Option<T>,
) -> Check {
    match parsed {
        Some(_) => Validation::success(()),
        None => Validation::fail(ConfigViolation::UnknownVariant {
            field,
            expected,
            value: value.to_string(),
        }),
    }
}
