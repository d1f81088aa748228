//! Degradation Walkthrough
//!
//! This example drives one service through a full degradation and recovery
//! cycle against an in-memory store.
//!
//! Key concepts:
//! - Consecutive errors push the service down one level at a time
//! - Consecutive healthy requests bring it back
//! - Every transition is reported through the audit sink
//!
//! Run with: cargo run --example degradation_walkthrough

use std::sync::Arc;
use tierguard::audit::TracingAuditLog;
use tierguard::config::LogFormat;
use tierguard::logging::init_logging;
use tierguard::store::MemoryStore;
use tierguard::{handle, ControllerConfig, HandlerEnv, Request, StateStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging(LogFormat::Pretty);
    println!("=== Degradation Walkthrough ===\n");

    let store = Arc::new(MemoryStore::new("system_state"));
    let env = HandlerEnv::new(
        ControllerConfig::default(),
        store.clone(),
        Arc::new(TracingAuditLog),
    );

    let phases = [
        ("errors", 5, true),
        ("errors", 10, true),
        ("healthy requests", 10, false),
        ("healthy requests", 20, false),
    ];

    for (label, count, error) in phases {
        let mut last = None;
        for _ in 0..count {
            let request = if error {
                Request::text(r#"{"error":true}"#)
            } else {
                Request::default()
            };
            last = Some(handle(&env, request).await);
        }

        let state = store.load("core-system").expect("memory store never fails");
        println!(
            "After {count} {label}: level {} (last response {} {})",
            state.current_level,
            last.as_ref().map(|r| r.status_code).unwrap_or_default(),
            last.map(|r| r.body).unwrap_or_default(),
        );
    }

    println!("\nKey Takeaways:");
    println!("- 5 errors: level 1 -> 2, 10 more errors: level 2 -> 3");
    println!("- 10 healthy: level 3 -> 2, 20 more healthy: level 2 -> 1");
    println!("- Status codes follow the request outcome, messages follow the level");

    println!("\n=== Example Complete ===");
}
