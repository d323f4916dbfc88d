//! Client metrics definitions
//!
//! OpenTelemetry instruments for monitoring feed client health. Metrics
//! are recorded automatically when observability is enabled through
//! [`FeedClientBuilder::with_observability`](crate::FeedClientBuilder::with_observability)
//! and exported to the configured OTLP backend.
//!
//! # Metrics Collected
//!
//! - **connection_state**: current lifecycle state (gauge)
//! - **events_received**: parsed events delivered to observers (counter, by level)
//! - **frames_dropped**: malformed frames discarded (counter)
//! - **messages_sent**: outbound payloads transmitted (counter)
//! - **errors_total**: absorbed failures (counter, by type)
//! - **reconnection_attempts** / **reconnection_success** (counters)

use astra_feed_core::Severity;
use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Meter},
    KeyValue,
};

/// Numeric encoding of [`ConnectionState`](crate::ConnectionState) for the gauge
///
/// 0=disconnected, 1=connecting, 2=connected, 3=reconnecting, 4=failed.
pub(crate) mod state_codes {
    pub const DISCONNECTED: i64 = 0;
    pub const CONNECTING: i64 = 1;
    pub const CONNECTED: i64 = 2;
    pub const RECONNECTING: i64 = 3;
    pub const FAILED: i64 = 4;
}

/// Feed client metrics
pub struct ClientMetrics {
    /// Connection state (see [`state_codes`])
    pub connection_state: Gauge<i64>,
    /// Events parsed and delivered to observers
    pub events_received: Counter<u64>,
    /// Malformed frames dropped without delivery
    pub frames_dropped: Counter<u64>,
    /// Outbound payloads transmitted
    pub messages_sent: Counter<u64>,
    /// Absorbed failures, by type
    pub errors_total: Counter<u64>,
    /// Reconnection attempts scheduled
    pub reconnection_attempts: Counter<u64>,
    /// Reconnections that re-established the feed
    pub reconnection_success: Counter<u64>,
}

impl ClientMetrics {
    /// Create metrics registered under the given service name
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create metrics against a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            connection_state: meter
                .i64_gauge("astra.feed.client.connection.state")
                .with_description("Connection state (0=disconnected, 1=connecting, 2=connected, 3=reconnecting, 4=failed)")
                .build(),
            events_received: meter
                .u64_counter("astra.feed.client.events.received")
                .with_description("Events parsed and delivered to observers")
                .build(),
            frames_dropped: meter
                .u64_counter("astra.feed.client.frames.dropped")
                .with_description("Inbound frames dropped as malformed")
                .build(),
            messages_sent: meter
                .u64_counter("astra.feed.client.messages.sent")
                .with_description("Outbound payloads transmitted")
                .build(),
            errors_total: meter
                .u64_counter("astra.feed.client.errors.total")
                .with_description("Failures absorbed by the client")
                .build(),
            reconnection_attempts: meter
                .u64_counter("astra.feed.client.reconnection.attempts")
                .with_description("Reconnection attempts scheduled")
                .build(),
            reconnection_success: meter
                .u64_counter("astra.feed.client.reconnection.success")
                .with_description("Reconnections that re-established the feed")
                .build(),
        }
    }

    /// Update the connection state gauge
    pub fn update_connection_state(&self, state: i64) {
        self.connection_state.record(state, &[]);
    }

    /// Record a delivered event
    pub fn record_event(&self, level: Severity) {
        let attributes = &[KeyValue::new("level", level.to_string())];
        self.events_received.add(1, attributes);
    }

    /// Record a dropped malformed frame
    pub fn record_dropped_frame(&self) {
        self.frames_dropped.add(1, &[]);
    }

    /// Record an outbound transmission
    pub fn record_sent(&self) {
        self.messages_sent.add(1, &[]);
    }

    /// Record an absorbed failure
    pub fn record_error(&self, error_type: &str) {
        let attributes = &[KeyValue::new("error_type", error_type.to_string())];
        self.errors_total.add(1, attributes);
    }

    /// Record a scheduled reconnection attempt
    pub fn record_reconnection_attempt(&self) {
        self.reconnection_attempts.add(1, &[]);
    }

    /// Record a successful reconnection
    pub fn record_reconnection_success(&self) {
        self.reconnection_success.add(1, &[]);
    }
}
