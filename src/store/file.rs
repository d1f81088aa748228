//! JSON file backed state store.
//!
//! One table is one file, `<dir>/<table>.json`, holding an object that maps
//! service ids to records. Writes go to a uniquely named temp file that is
//! renamed over the table, so readers never observe a half-written table.

use super::error::StoreError;
use super::{record, StateStore};
use crate::core::ServiceHealthState;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    table: String,
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, table: impl Into<String>) -> Self {
        let table = table.into();
        let path = dir.as_ref().join(format!("{table}.json"));
        Self { table, path }
    }

    /// Location of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(records)) => Ok(records),
            Ok(_) => Err(StoreError::Corrupt {
                table: self.table.clone(),
                reason: "table document is not a JSON object".to_string(),
            }),
            Err(err) => Err(StoreError::Corrupt {
                table: self.table.clone(),
                reason: err.to_string(),
            }),
        }
    }

    fn write_table(&self, records: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let temp_path = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp_path, json)?;
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn table(&self) -> &str {
        &self.table
    }

    fn load(&self, service_id: &str) -> Result<ServiceHealthState, StoreError> {
        let records = self.read_table()?;
        tracing::debug!(
            table = %self.table,
            service_id,
            found = records.contains_key(service_id),
            "loaded health record"
        );

        Ok(match records.get(service_id) {
            Some(document) => record::decode(service_id, document),
            None => ServiceHealthState::new(service_id),
        })
    }

    fn save(&self, state: &ServiceHealthState) -> Result<(), StoreError> {
        let mut records = self.read_table()?;
        records.insert(state.service_id.clone(), record::encode(state));
        self.write_table(&records)?;

        tracing::debug!(
            table = %self.table,
            service_id = %state.service_id,
            level = state.current_level.as_u8(),
            "saved health record"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tierguard-store-{}", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = temp_dir();
        let store = JsonFileStore::new(&dir, "system_state");

        let state = store.load("core-system").unwrap();
        assert_eq!(state, ServiceHealthState::new("core-system"));
        assert!(!store.path().exists());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = temp_dir();
        let store = JsonFileStore::new(&dir, "system_state");

        let mut state = ServiceHealthState::new("core-system");
        state.enter(Level::Minimal);
        state.consecutive_healthy = 6;
        store.save(&state).unwrap();

        assert_eq!(store.load("core-system").unwrap(), state);

        store.save(&state).unwrap();
        assert_eq!(store.load("core-system").unwrap(), state);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_keeps_other_services() {
        let dir = temp_dir();
        let store = JsonFileStore::new(&dir, "system_state");

        let mut a = ServiceHealthState::new("a");
        a.consecutive_errors = 1;
        let b = ServiceHealthState::new("b");
        store.save(&a).unwrap();
        store.save(&b).unwrap();

        assert_eq!(store.load("a").unwrap(), a);
        assert_eq!(store.load("b").unwrap(), b);

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_table_is_an_error() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let store = JsonFileStore::new(&dir, "system_state");
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(
            store.load("core-system"),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(matches!(
            store.save(&ServiceHealthState::new("core-system")),
            Err(StoreError::Corrupt { .. })
        ));

        fs::write(store.path(), "[]").unwrap();
        assert!(matches!(
            store.load("core-system"),
            Err(StoreError::Corrupt { .. })
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn partial_record_in_file_uses_defaults() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let store = JsonFileStore::new(&dir, "system_state");
        fs::write(store.path(), r#"{"core-system": {"currentLevel": 2}}"#).unwrap();

        let state = store.load("core-system").unwrap();
        assert_eq!(state.current_level, Level::Limited);
        assert_eq!(state.consecutive_errors, 0);
        assert_eq!(state.consecutive_healthy, 0);

        fs::remove_dir_all(&dir).ok();
    }
}
