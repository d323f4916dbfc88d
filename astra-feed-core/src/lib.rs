//! Core types for the Astra-Grid agent feed
//!
//! This crate provides the foundation the feed client builds on:
//!
//! - **Event model**: the [`AgentEvent`] structure parsed from every frame
//! - **Codec**: JSON text-frame encoding and decoding
//! - **Errors**: the [`Error`] taxonomy used by the fallible internals
//! - **Configuration**: [`FeedConfig`], the per-client tuning surface
//! - **Observability**: OpenTelemetry bootstrap for deployments that
//!   export traces, metrics and logs
//!
//! The crate is transport-agnostic: it defines what travels over the feed
//! without dictating how. `astra-feed-client` supplies the WebSocket
//! transport and the reconnect machinery on top of this foundation.
//!
//! # Example
//!
//! ```rust
//! use astra_feed_core::{codec, Severity};
//!
//! let event = codec::decode_event(
//!     r#"{"agent":"Infrastructure Scout","message":"scan complete","level":"warning"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(event.agent, "Infrastructure Scout");
//! assert_eq!(event.level, Severity::Warning);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod observability;

// Re-export the most commonly used types for convenience
pub use config::{FeedConfig, DEFAULT_FEED_URL};
pub use error::{Error, Result};
pub use event::{AgentEvent, Severity};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
