//! Event model for the Astra-Grid agent feed
//!
//! Every frame on the feed is a JSON object describing something one of the
//! inspection agents did or observed: which agent it came from, a
//! human-readable message, and a severity tag. The client parses frames
//! into [`AgentEvent`] before dispatch but attaches no further meaning to
//! them; interpretation belongs to the observers.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "agent": "Network Analyst",
//!   "message": "Temperature trend detected: +0.5C/day",
//!   "level": "warning",
//!   "timestamp": "2026-08-28T10:15:00Z"
//! }
//! ```
//!
//! All fields are optional on the wire. A missing `level` defaults to
//! `normal`, a missing `timestamp` is stamped at parse time (arrival time),
//! and any extra fields are preserved opaquely in `extra` so observers can
//! inspect payloads the model does not name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity tag carried by feed events
///
/// Matches the levels emitted by the agent services. Unknown values
/// deserialize to `Normal` so a newer backend cannot break older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something worth attention but not yet a problem
    Warning,
    /// A problem requiring intervention
    Critical,
    /// Routine activity; also the catch-all for levels this client does
    /// not know (serde requires the `other` variant to come last)
    #[default]
    #[serde(other)]
    Normal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One parsed event from the agent feed
///
/// The client hands a clone of the event to every registered observer, in
/// subscription order. `AgentEvent` is intentionally permissive: the feed
/// is best-effort telemetry and a sparse frame is still worth delivering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Identifier of the agent that produced the event
    #[serde(default)]
    pub agent: String,

    /// Human-readable description of what happened
    #[serde(default)]
    pub message: String,

    /// Severity tag, `normal` when absent
    #[serde(default)]
    pub level: Severity,

    /// Event time; stamped at parse time when the frame carries none
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Any additional fields present on the frame, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AgentEvent {
    /// Create an event stamped with the current time
    pub fn new(agent: impl Into<String>, message: impl Into<String>, level: Severity) -> Self {
        Self {
            agent: agent.into(),
            message: message.into(),
            level,
            timestamp: Utc::now(),
            extra: serde_json::Map::new(),
        }
    }
}
