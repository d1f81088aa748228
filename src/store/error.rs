//! State store error types.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`StateStore`](super::StateStore).
///
/// Every variant means the store could not be used; a missing record is
/// not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store refused or could not serve the call
    #[error("State store '{table}' unavailable: {reason}")]
    Unavailable { table: String, reason: String },

    /// The call did not complete in time
    #[error("State store '{table}' timed out after {elapsed:?}")]
    Timeout { table: String, elapsed: Duration },

    /// Underlying I/O failed
    #[error("State store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The table exists but cannot be read as a table of records
    #[error("State table '{table}' is corrupt: {reason}")]
    Corrupt { table: String, reason: String },

    /// Encoding the table for writing failed
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn unavailable(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
