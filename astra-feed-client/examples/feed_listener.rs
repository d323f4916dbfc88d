//! Example demonstrating a resilient agent feed listener
//!
//! Connects to an agent feed endpoint, subscribes two observers (one
//! printing every event, one keeping a rolling log of the most recent
//! entries) and reports the connection state while the feed runs.
//!
//! Point it at a running feed endpoint:
//! ```bash
//! ASTRA_FEED_URL=ws://localhost:8000/api/v1/agents/ws cargo run --example feed_listener
//! ```
//!
//! Try stopping and restarting the endpoint to see reconnection with
//! exponential backoff in action.

use astra_feed_client::{EventLog, FeedClientBuilder};
use astra_feed_core::{FeedConfig, Severity};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Agent Feed Listener ===\n");

    let config = FeedConfig::default();
    println!("Connecting to {} ...", config.url);

    let client = FeedClientBuilder::from_config(config)
        .base_delay(Duration::from_secs(1))
        .max_delay(Duration::from_secs(30))
        .max_reconnect_attempts(5)
        .on_fault(|fault| println!("✗ Fault: {}", fault))
        .build();

    // Print every event as it arrives
    let _printer = client.subscribe(|event| {
        let marker = match event.level {
            Severity::Critical => "🔴",
            Severity::Warning => "🟡",
            Severity::Normal => "🟢",
        };
        println!("{} [{}] {}: {}", marker, event.timestamp, event.agent, event.message);
    });

    // Keep the most recent events around for the periodic summary
    let log = Arc::new(EventLog::with_default_capacity());
    let _log_sub = EventLog::attach(&log, &client);

    client.connect();
    println!("✓ Feed client started\n");
    println!("Press Ctrl+C to exit.\n");

    loop {
        tokio::time::sleep(Duration::from_secs(10)).await;
        println!(
            "--- state: {:?}, {} event(s) in the rolling log ---",
            client.state(),
            log.len()
        );
    }
}
