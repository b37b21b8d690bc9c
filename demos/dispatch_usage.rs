//! Example usage of the event registry: limits, receiver binding, wildcard
//! dispatch, detach

use relay::{callback, EventRegistry, ExecutionLimit};
use serde_json::json;
use std::sync::Arc;

fn main() {
    // ========================================
    // Basic registration and dispatch
    // ========================================

    println!("=== Basic dispatch ===\n");

    let registry = EventRegistry::new();

    registry.register(
        "user.login",
        callback(|_, args| println!("user logged in: {args:?}")),
        ExecutionLimit::Unlimited,
    );
    registry.dispatch("user.login", &[json!("ada")]);
    registry.dispatch("user.login", &[json!("grace")]);

    // ========================================
    // Execution limits
    // ========================================

    println!("\n=== Execution limits ===\n");

    registry.register_once(
        "cache.warmed",
        callback(|_, _| println!("cache warmed (fires once)")),
    );
    registry.dispatch("cache.warmed", &[]);
    registry.dispatch("cache.warmed", &[]); // silent: the listener is spent

    // ========================================
    // Receiver binding
    // ========================================

    println!("\n=== Receiver binding ===\n");

    registry.register(
        "config.changed",
        callback(|ctx, _| {
            if let Some(section) = ctx.and_then(|c| c.get("section")) {
                println!("config section changed: {section}");
            }
        }),
        ExecutionLimit::Unlimited,
    );
    registry.dispatch_with("config.changed", Some(&json!({"section": "network"})), &[]);

    // ========================================
    // Wildcard dispatch
    // ========================================

    println!("\n=== Wildcard dispatch ===\n");

    registry.register(
        "user.logout",
        callback(|_, _| println!("user logged out")),
        ExecutionLimit::Unlimited,
    );
    // No "user.*" sequence is registered, so the dispatched name is treated
    // as a pattern over the registered names
    registry.dispatch("user.*", &[json!("broadcast")]);

    // ========================================
    // Detach by handle
    // ========================================

    println!("\n=== Detach ===\n");

    let audit = callback(|_, args| println!("audit: {args:?}"));
    registry.register("job.finished", Arc::clone(&audit), ExecutionLimit::Unlimited);
    registry.dispatch("job.finished", &[json!({"id": 7})]);

    registry.detach("job.finished", &audit);
    registry.dispatch("job.finished", &[json!({"id": 8})]); // silent

    println!("\nevents registered: {}", registry.event_count());
}
