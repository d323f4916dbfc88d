//! Structured fault reporting
//!
//! The feed client never returns errors from its public methods: every
//! failure path degrades to "stop delivering updates". What it does
//! instead is describe each failure as a [`Fault`] and hand it to an
//! injectable hook, so hosting applications (and tests) can observe
//! exactly what went wrong without the client ever raising.
//!
//! The default hook logs through `tracing`; override it with
//! [`FeedClientBuilder::on_fault`](crate::FeedClientBuilder::on_fault).

use std::sync::Arc;

/// A failure the client absorbed instead of raising
#[derive(Debug, Clone)]
pub enum Fault {
    /// The transport failed to connect, errored mid-stream, or the peer
    /// closed the connection unexpectedly
    Transport {
        /// Error detail from the transport layer
        detail: String,
    },
    /// An inbound frame was dropped because it failed to parse
    MalformedFrame {
        /// Parse error detail
        detail: String,
    },
    /// An outbound payload was dropped because it failed to serialize
    Serialization {
        /// Encoding error detail
        detail: String,
    },
    /// An observer panicked during delivery; remaining observers still
    /// received the event
    ObserverPanic,
    /// The reconnect budget is spent; the client is idle until a fresh
    /// `connect()` call
    ReconnectExhausted {
        /// Attempts consumed before giving up
        attempts: u32,
    },
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Transport { detail } => write!(f, "transport failure: {}", detail),
            Fault::MalformedFrame { detail } => write!(f, "malformed frame dropped: {}", detail),
            Fault::Serialization { detail } => write!(f, "payload dropped: {}", detail),
            Fault::ObserverPanic => write!(f, "observer panicked during delivery"),
            Fault::ReconnectExhausted { attempts } => {
                write!(f, "reconnect abandoned after {} attempts", attempts)
            }
        }
    }
}

/// Callback invoked for every absorbed failure
pub type FaultHook = Arc<dyn Fn(Fault) + Send + Sync>;

/// The hook installed when the builder is given none: log and move on
pub(crate) fn default_hook() -> FaultHook {
    Arc::new(|fault| match &fault {
        Fault::Transport { .. } | Fault::ReconnectExhausted { .. } => {
            tracing::warn!(%fault, "feed fault");
        }
        _ => {
            tracing::debug!(%fault, "feed fault");
        }
    })
}
