//! Persistence for per-service health records.
//!
//! A [`StateStore`] is a table of JSON documents keyed by service id. Reads
//! are read-modify-write friendly: a missing record loads as the initial
//! state, and `save` always overwrites the whole record.
//!
//! Stores do not coordinate concurrent writers. Two invocations that load
//! the same record and save independently lose one of the updates; the last
//! write wins.

use crate::core::ServiceHealthState;

pub mod error;
mod file;
mod memory;
pub mod record;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Durable storage for health records.
pub trait StateStore: Send + Sync {
    /// Name of the table or collection holding the records.
    fn table(&self) -> &str;

    /// Load the record for `service_id`, or the initial state if none exists.
    fn load(&self, service_id: &str) -> Result<ServiceHealthState, StoreError>;

    /// Overwrite the record for `state.service_id`.
    fn save(&self, state: &ServiceHealthState) -> Result<(), StoreError>;
}
