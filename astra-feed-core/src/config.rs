//! Feed client configuration
//!
//! All the knobs the reconnect machinery depends on live here rather than
//! as constants inside the client, so tests can run with millisecond
//! delays and tiny attempt budgets while production keeps the defaults.
//!
//! # Defaults
//!
//! - Endpoint: `ws://localhost:8000/api/v1/agents/ws` (the local gateway)
//! - Max reconnect attempts: 5
//! - Base backoff delay: 1 s, doubled per attempt
//! - Backoff cap: 30 s
//!
//! # Examples
//!
//! ```rust
//! use astra_feed_core::FeedConfig;
//! use std::time::Duration;
//!
//! let config = FeedConfig::new("ws://feed.astra-grid.internal/agents/ws")
//!     .with_max_reconnect_attempts(10)
//!     .with_base_delay(Duration::from_millis(500));
//! ```

use std::time::Duration;

/// Default feed endpoint, matching the local gateway deployment
pub const DEFAULT_FEED_URL: &str = "ws://localhost:8000/api/v1/agents/ws";

/// Configuration for a feed client instance
///
/// Each client owns its own copy; there is no shared global configuration,
/// so isolated instances (and parallel tests) cannot leak state into one
/// another.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint the client connects to
    pub url: String,

    /// Reconnect attempts allowed per outage before the client gives up
    ///
    /// A fresh `connect()` call resets the budget.
    pub max_reconnect_attempts: u32,

    /// Base delay for exponential backoff
    ///
    /// The delay before attempt `k` is `min(base * 2^k, cap)`, so the
    /// first retry waits twice the base delay.
    pub base_delay: Duration,

    /// Upper bound on any single backoff delay
    pub max_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("ASTRA_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
            max_reconnect_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl FeedConfig {
    /// Create a configuration for the given endpoint with default backoff
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the reconnect attempt budget
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set the base backoff delay
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the backoff delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}
