//! Error types for the Astra-Grid feed
//!
//! The feed client is deliberately quiet at its public surface: connection
//! trouble is absorbed by the reconnect machinery and malformed frames are
//! dropped per-message. Internally, though, the fallible steps (parsing,
//! serialization, transport I/O) return this crate's `Error` so callers of
//! the lower-level pieces can use `?` as usual.
//!
//! # Error Categories
//!
//! - **Frame errors**: `Parse` (inbound frame was not valid JSON)
//! - **Encoding errors**: `Serialization` (payload could not be encoded)
//! - **Transport errors**: `WebSocket`, `Io`, `ConnectionClosed`
//! - **Everything else**: `Internal`

use thiserror::Error;

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering the fallible internals of the feed
///
/// Uses `thiserror` for `std::error::Error` and display impls. Note that
/// none of these variants escape through `FeedClient`'s public methods;
/// they surface through the structured fault hook and `tracing` instead.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// An inbound frame was not a valid JSON event
    ///
    /// Raised by the codec when a text frame fails to parse. The client
    /// drops the frame and carries on; connection state is unaffected.
    #[error("Malformed frame: {0}")]
    Parse(String),

    /// A payload could not be serialized to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// WebSocket transport layer error
    ///
    /// Covers handshake failures, protocol violations and frame-level
    /// errors from the underlying socket.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Low-level input/output error
    #[error("IO error: {0}")]
    Io(String),

    /// The connection is no longer active
    ///
    /// Reported when the peer closes the stream or the write half fails.
    /// The reconnect policy decides what happens next.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Unexpected internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
