//! Client builder
//!
//! The builder wires together everything a [`FeedClient`] depends on:
//! the endpoint configuration, the reconnect policy, the transport
//! connector, the fault hook and (optionally) observability. Every
//! dependency has a production default, so the common case stays short:
//!
//! ```rust,no_run
//! use astra_feed_client::FeedClientBuilder;
//!
//! # async fn example() {
//! let client = FeedClientBuilder::new("ws://localhost:8000/api/v1/agents/ws")
//!     .build();
//! client.connect();
//! # }
//! ```
//!
//! Tests swap in channel-backed connectors and tight backoff budgets:
//!
//! ```rust,ignore
//! let client = FeedClientBuilder::new("mem://feed")
//!     .with_connector(Arc::new(scripted_connector))
//!     .with_reconnect(Box::new(FixedDelay::new(Duration::from_millis(10))))
//!     .on_fault(move |fault| faults.lock().unwrap().push(fault))
//!     .build();
//! ```

use crate::backoff::{ExponentialBackoff, ReconnectPolicy};
use crate::client::{ClientInner, FeedClient};
use crate::connection_state::ConnectionManager;
use crate::fault::{default_hook, Fault, FaultHook};
use crate::metrics::ClientMetrics;
use crate::transport::{Connector, WsConnector};
use astra_feed_core::{FeedConfig, ObservabilityConfig};
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring and creating a [`FeedClient`]
pub struct FeedClientBuilder {
    config: FeedConfig,
    policy: Option<Box<dyn ReconnectPolicy>>,
    connector: Option<Arc<dyn Connector>>,
    fault_hook: Option<FaultHook>,
    observability: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl FeedClientBuilder {
    /// Start a builder for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_config(FeedConfig::new(url))
    }

    /// Start a builder from a complete configuration
    pub fn from_config(config: FeedConfig) -> Self {
        Self {
            config,
            policy: None,
            connector: None,
            fault_hook: None,
            observability: None,
            service_name: None,
        }
    }

    /// Replace the whole endpoint configuration
    pub fn config(mut self, config: FeedConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the reconnect attempt budget
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    /// Set the base backoff delay
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    /// Set the backoff delay cap
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    /// Use a custom reconnect policy instead of the configured
    /// exponential backoff
    pub fn with_reconnect(mut self, policy: Box<dyn ReconnectPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Inject a transport connector (tests use channel-backed ones)
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Install a structured fault hook
    ///
    /// Replaces the default hook, which logs through `tracing`. The hook
    /// receives every failure the client absorbs.
    pub fn on_fault<F>(mut self, hook: F) -> Self
    where
        F: Fn(Fault) + Send + Sync + 'static,
    {
        self.fault_hook = Some(Arc::new(hook));
        self
    }

    /// Enable OpenTelemetry observability with a custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with defaults
    pub fn with_default_observability(mut self) -> Self {
        self.observability = Some(ObservabilityConfig::default());
        self
    }

    /// Set the service name used for telemetry
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client
    ///
    /// The client starts disconnected; call
    /// [`connect()`](FeedClient::connect) to bring the feed up.
    pub fn build(self) -> FeedClient {
        let metrics = match self.observability {
            Some(mut obs_config) => {
                if let Some(name) = self.service_name {
                    obs_config.service_name = name;
                }
                let service_name = obs_config.service_name.clone();
                if let Err(e) = astra_feed_core::init_observability(obs_config) {
                    tracing::warn!(error = %e, "observability init failed, metrics disabled");
                    None
                } else {
                    Some(Arc::new(ClientMetrics::new(service_name)))
                }
            }
            None => None,
        };

        let policy = self
            .policy
            .unwrap_or_else(|| Box::new(ExponentialBackoff::from_config(&self.config)));
        let connector = self.connector.unwrap_or_else(|| Arc::new(WsConnector));
        let fault_hook = self.fault_hook.unwrap_or_else(default_hook);

        let inner = ClientInner::new(
            self.config,
            connector,
            ConnectionManager::new(policy),
            fault_hook,
            metrics,
        );
        FeedClient::from_inner(Arc::new(inner))
    }
}
