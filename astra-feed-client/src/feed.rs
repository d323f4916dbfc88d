//! Bounded recent-event log
//!
//! Dashboard views show the tail of the feed, not its history: the
//! interaction panel keeps the most recent 50 entries and discards the
//! rest. [`EventLog`] packages that pattern so every view does not
//! reimplement it. The client itself still delivers synchronously with
//! no queue; the log is a consumer-side convenience, not backpressure.
//!
//! # Examples
//!
//! ```rust,no_run
//! use astra_feed_client::{EventLog, FeedClient};
//! use astra_feed_core::FeedConfig;
//! use std::sync::Arc;
//!
//! let client = FeedClient::new(FeedConfig::default());
//! let log = Arc::new(EventLog::with_default_capacity());
//! let _sub = EventLog::attach(&log, &client);
//!
//! client.connect();
//! // later on: log.recent() holds at most the latest 50 events
//! ```

use crate::client::FeedClient;
use crate::connection_state::lock;
use crate::observers::Subscription;
use astra_feed_core::AgentEvent;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Entries kept by [`EventLog::with_default_capacity`], matching the
/// dashboard's interaction panel
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Fixed-capacity log of the most recent feed events
///
/// Pushing beyond capacity evicts the oldest entry. All methods take
/// `&self`; the log is safe to share between the driver task and readers.
pub struct EventLog {
    capacity: usize,
    entries: Mutex<VecDeque<AgentEvent>>,
}

impl EventLog {
    /// Create a log keeping at most `capacity` events
    ///
    /// A zero capacity is bumped to one; a log that can hold nothing
    /// has no meaning.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Create a log with the dashboard's 50-entry window
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }

    /// Append an event, evicting the oldest once full
    pub fn push(&self, event: AgentEvent) {
        let mut entries = lock(&self.entries);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(event);
    }

    /// The retained events, oldest first
    pub fn recent(&self) -> Vec<AgentEvent> {
        lock(&self.entries).iter().cloned().collect()
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether the log holds no events
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained events
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove all retained events
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Subscribe the log to a client's feed
    ///
    /// Keep the returned [`Subscription`] to cancel later; the log stays
    /// attached for the client's lifetime otherwise.
    pub fn attach(log: &Arc<Self>, client: &FeedClient) -> Subscription {
        let log = Arc::clone(log);
        client.subscribe(move |event| log.push(event))
    }
}
