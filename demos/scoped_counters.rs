//! Scoped Counters Example
//!
//! This example builds a small scope tree, runs writers on several tokio
//! tasks and shows how shared streams replay their latest value to late
//! subscribers. Debug logging is captured in memory and printed at the end.
//!
//! Run with: cargo run --example scoped_counters

use serde_json::{json, Value};
use std::sync::Arc;
use strata_sdk::prelude::*;
use strata_sdk::MemoryLogger;

fn increment(by: i64) -> Reducer {
    Reducer::set_prop("count", Value::Null)
        .computed(move |current| json!(current.and_then(|v| v.as_i64()).unwrap_or(0) + by))
        .caller("Counter::increment")
        .args([json!(by)])
}

fn count() -> Selector<i64> {
    Selector::prop("count")
        .filter_map(|v| v.as_i64())
        .caller("Counter::count")
}

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    println!("=== Scoped Counters Example ===\n");

    let logger = Arc::new(MemoryLogger::new());
    let config = StoreConfigBuilder::new().debug(true).build();
    let store = Store::with_logger(config, logger.clone());

    let dashboard = store.scope("dashboard", json!({ "title": "Clicks" }));
    let left = dashboard.child("left", json!({ "count": 0 }));
    let right = dashboard.child("right", json!({ "count": 100 }));

    println!("Scopes:");
    for scope in store.scopes() {
        println!("  - {}", scope);
    }
    println!();

    let left_counts = left.stream(count())?;
    let mut watcher = left_counts.subscribe();

    println!("Spawning 4 writers, 5 increments each, on the left counter...");
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let left = Arc::clone(&left);
            tokio::spawn(async move {
                for _ in 0..5 {
                    left.dispatch(increment(1))?;
                    tokio::task::yield_now().await;
                }
                Ok::<(), StoreError>(())
            })
        })
        .collect();
    for writer in writers {
        if let Ok(result) = writer.await {
            result?;
        }
    }

    right.dispatch(increment(-1))?;

    let mut seen = Vec::new();
    while let Some(item) = watcher.next_pending() {
        seen.push(item?);
    }
    println!("Left counter emitted {} values, last = {:?}", seen.len(), seen.last());

    let mut late = left_counts.subscribe();
    println!("Late subscriber replay: {:?}", late.next().await);
    println!(
        "Subscribers: {}, connected: {}",
        left_counts.subscriber_count(),
        left_counts.is_connected()
    );

    drop(watcher);
    drop(late);
    println!("After dropping both: connected = {}\n", left_counts.is_connected());

    println!("Right counter: {:?}", right.value(&count())?);
    println!("Dashboard:     {}\n", dashboard.snapshot()?.to_plain());

    let entries = logger.entries();
    println!("Captured {} log entries, first five:", entries.len());
    for entry in entries.iter().take(5) {
        println!(
            "  #{} {} [{}] {}",
            entry.id,
            entry.message,
            entry.scope.as_deref().unwrap_or("-"),
            entry.detail.as_deref().unwrap_or("")
        );
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
