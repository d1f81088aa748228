//! In-process state store.

use super::error::StoreError;
use super::{record, StateStore};
use crate::core::ServiceHealthState;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Table of records held in memory. Records are kept as JSON documents so
/// reads go through the same lenient decoding as durable stores.
#[derive(Debug)]
pub struct MemoryStore {
    table: String,
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Store a raw document, bypassing encoding.
    pub fn insert_raw(&self, service_id: impl Into<String>, document: Value) {
        self.records.write().insert(service_id.into(), document);
    }

    /// Raw document for `service_id`, if present.
    pub fn raw(&self, service_id: &str) -> Option<Value> {
        self.records.read().get(service_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl StateStore for MemoryStore {
    fn table(&self) -> &str {
        &self.table
    }

    fn load(&self, service_id: &str) -> Result<ServiceHealthState, StoreError> {
        Ok(match self.records.read().get(service_id) {
            Some(document) => record::decode(service_id, document),
            None => ServiceHealthState::new(service_id),
        })
    }

    fn save(&self, state: &ServiceHealthState) -> Result<(), StoreError> {
        self.records
            .write()
            .insert(state.service_id.clone(), record::encode(state));
        Ok(())
    }
}
