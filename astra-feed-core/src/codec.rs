//! Frame codec for the agent feed
//!
//! The feed speaks newline-free JSON text frames: each inbound frame is one
//! JSON object, each outbound payload is serialized to one JSON string.
//! This module is the single place where that conversion happens, so the
//! client and its tests agree on what "malformed" means.
//!
//! # Error Handling
//!
//! - Inbound frames that fail to parse return [`Error::Parse`]; the client
//!   drops the frame without touching connection state.
//! - Outbound payloads that fail to serialize return [`Error::Serialization`].
//!
//! # Examples
//!
//! ```rust
//! use astra_feed_core::{codec, Severity};
//!
//! let event = codec::decode_event(r#"{"agent":"Scout","message":"ready"}"#).unwrap();
//! assert_eq!(event.agent, "Scout");
//! assert_eq!(event.level, Severity::Normal);
//!
//! assert!(codec::decode_event("not json").is_err());
//! ```

use crate::error::{Error, Result};
use crate::event::AgentEvent;
use serde::Serialize;

/// Encode any serializable payload to a JSON text frame
///
/// Used for outbound commands pushed over the feed. Returns
/// `Error::Serialization` if the payload cannot be represented as JSON.
pub fn encode<T: Serialize>(payload: &T) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode one inbound text frame into an [`AgentEvent`]
///
/// The frame must be a JSON object. Fields the event model does not name
/// are preserved in `AgentEvent::extra`; missing fields take their
/// defaults. Anything that is not a JSON object is a parse error.
pub fn decode_event(frame: &str) -> Result<AgentEvent> {
    serde_json::from_str(frame).map_err(|e| Error::Parse(e.to_string()))
}
