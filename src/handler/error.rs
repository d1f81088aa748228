//! Handler error types.

use crate::core::Level;
use crate::store::StoreError;
use thiserror::Error;

/// Failures that stop an invocation. Both are store failures; payload
/// problems never surface here.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The health record could not be read
    #[error("Failed to load health record: {0}")]
    Load(#[source] StoreError),

    /// The new record could not be written; the computed level is dropped
    #[error("Failed to persist health record (level {from} -> {computed} not applied): {source}")]
    Persist {
        from: Level,
        computed: Level,
        #[source]
        source: StoreError,
    },
}

impl HandlerError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::Load(source) | Self::Persist { source, .. } => source,
        }
    }
}
