//! Reconnecting WebSocket client for the Astra-Grid agent feed
//!
//! This crate provides a best-effort real-time event client: it keeps a
//! persistent JSON-text-frame connection to a feed endpoint, fans every
//! parsed event out to registered observers in subscription order, and
//! re-establishes the connection with bounded exponential backoff when
//! it drops unexpectedly.
//!
//! # Core Features
//!
//! - **Observer fan-out**: ordered, panic-isolated delivery to any
//!   number of subscriptions, each cancellable via its own handle
//! - **Auto-reconnection**: pluggable policies with exponential backoff
//!   defaults (1s base, 30s cap, 5 attempts)
//! - **Fire-and-forget sends**: outbound payloads transmit only while
//!   connected, dropped silently otherwise
//! - **Quiet failure surface**: no public method returns an error; every
//!   absorbed failure reaches an injectable structured fault hook
//! - **Observability**: `tracing` throughout, optional OpenTelemetry
//!   metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use astra_feed_client::FeedClient;
//! use astra_feed_core::FeedConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = FeedClient::new(FeedConfig::default());
//!
//!     let subscription = client.subscribe(|event| {
//!         println!("[{}] {}: {}", event.level, event.agent, event.message);
//!     });
//!
//!     client.connect();
//!
//!     // ... events flow to the observer until ...
//!     subscription.cancel();
//!     client.disconnect();
//! }
//! ```
//!
//! # Testing Without Sockets
//!
//! The transport lives behind the [`Connector`] trait and time behind
//! tokio's clock, so the reconnect and dispatch logic run
//! deterministically under `tokio::time::pause()` with channel-backed
//! connectors. See the integration tests for the pattern.

mod backoff;
mod builder;
mod client;
mod connection_state;
mod fault;
mod feed;
mod metrics;
mod observers;
mod transport;

pub use backoff::{ExponentialBackoff, FixedDelay, NoReconnect, ReconnectPolicy};
pub use builder::FeedClientBuilder;
pub use client::FeedClient;
pub use connection_state::{ConnectionManager, ConnectionState};
pub use fault::{Fault, FaultHook};
pub use feed::{EventLog, DEFAULT_LOG_CAPACITY};
pub use metrics::ClientMetrics;
pub use observers::{ObserverFn, ObserverRegistry, Subscription};
pub use transport::{Connector, FrameSink, FrameStream, TransportPair, WsConnector};
