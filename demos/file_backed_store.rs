//! File Backed Store
//!
//! This example persists the health record to a JSON table on disk, the
//! same way the `tierguard` binary does, and shows that the streak survives
//! across independent handler environments.
//!
//! Run with: cargo run --example file_backed_store

use std::fs;
use std::sync::Arc;
use tierguard::audit::JsonLinesAuditLog;
use tierguard::store::JsonFileStore;
use tierguard::{handle, ControllerConfig, HandlerEnv, Request, StateStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== File Backed Store Example ===\n");

    let dir = std::env::temp_dir().join("tierguard-demo");
    let config = ControllerConfig {
        state_dir: dir.clone(),
        ..ControllerConfig::default()
    };

    // Each "process" builds a fresh environment, like a cold start.
    for run in 1..=6 {
        let store = Arc::new(JsonFileStore::new(&config.state_dir, &config.table_name));
        let env = HandlerEnv::new(config.clone(), store, Arc::new(JsonLinesAuditLog::stdout()));

        let response = handle(&env, Request::text(r#"{"error":true}"#)).await;
        println!("  run {run}: {} {}\n", response.status_code, response.body);
    }

    let store = JsonFileStore::new(&config.state_dir, &config.table_name);
    match store.load(&config.service_id) {
        Ok(state) => println!("Stored record: {state:?}"),
        Err(err) => println!("Failed to read table {}: {err}", store.path().display()),
    }

    // Cleanup
    fs::remove_dir_all(&dir).ok();

    println!("\n=== Example Complete ===");
}
