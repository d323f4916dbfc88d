//! Example demonstrating sending commands over the agent feed
//!
//! The feed socket is bidirectional: observers receive agent events
//! while the same connection carries JSON commands back to the
//! orchestrator. Sends while the connection is down are dropped
//! silently, so the loop below keeps sending through outages.
//!
//! ```bash
//! ASTRA_FEED_URL=ws://localhost:8000/api/v1/agents/ws cargo run --example command_sender
//! ```

use astra_feed_client::FeedClientBuilder;
use astra_feed_core::FeedConfig;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct AgentCommand {
    action: String,
    target: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Agent Command Sender ===\n");

    let config = FeedConfig::default();
    println!("Connecting to {} ...", config.url);

    let client = FeedClientBuilder::from_config(config).build();

    let _ack_printer = client.subscribe(|event| {
        println!("📩 {}: {}", event.agent, event.message);
    });

    client.connect();

    let targets = ["atlas", "vega", "orion"];
    for (i, target) in targets.iter().cycle().take(9).enumerate() {
        tokio::time::sleep(Duration::from_secs(2)).await;

        let command = AgentCommand {
            action: "status_report".to_string(),
            target: (*target).to_string(),
        };

        if client.is_connected() {
            client.send(&command);
            println!("✓ [{}] requested status from {}", i + 1, target);
        } else {
            println!("✗ [{}] feed is {:?}, command skipped", i + 1, client.state());
        }
    }

    client.disconnect();
    println!("\nDone.");
    Ok(())
}
