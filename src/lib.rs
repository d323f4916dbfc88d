//! Astra-Feed - resilient real-time event feed for the Astra-Grid dashboard
//!
//! This is the main convenience crate that re-exports the Astra-Feed
//! sub-crates. Use this crate if you want a single dependency that provides
//! both the event model and the reconnecting client.
//!
//! # Architecture
//!
//! Astra-Feed is organized into modular crates:
//!
//! - **astra-feed-core**: Event model, codec, error handling, observability
//! - **astra-feed-client**: Reconnecting WebSocket feed client
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use astra_feed::FeedClient;
//! use astra_feed::FeedConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = FeedClient::new(FeedConfig::default());
//!
//!     let _sub = client.subscribe(|event| {
//!         println!("[{}] {}: {}", event.level, event.agent, event.message);
//!     });
//!
//!     client.connect();
//!
//!     // ... the feed delivers events until disconnect() ...
//! }
//! ```

// Re-export all public APIs from sub-crates
// This allows users to access everything through `astra_feed::` prefix
pub use astra_feed_client as client;
pub use astra_feed_core as core;

// Convenience re-exports of the most commonly used types
pub use astra_feed_client::{FeedClient, FeedClientBuilder, Subscription};
pub use astra_feed_core::{AgentEvent, FeedConfig, Severity};
