//! The resilient feed client
//!
//! `FeedClient` maintains a best-effort persistent connection to one feed
//! endpoint and fans received events out to subscribers, surviving
//! transient network failure without caller intervention.
//!
//! # Client Lifecycle
//!
//! 1. **Construct**: `FeedClient::new(config)` or through the builder
//! 2. **Subscribe**: register observers (before or after connecting)
//! 3. **Connect**: `connect()` starts the driver task
//! 4. **Reconnect**: unexpected closures retry with bounded backoff
//! 5. **Disconnect**: `disconnect()` closes and cancels pending retries
//!
//! # Concurrency Model
//!
//! One driver task per connection epoch owns the transport halves; every
//! public method returns immediately. `connect`, `send`, `subscribe` and
//! `disconnect` are all safe from any task, and clones of the client
//! share the same connection and registry. Every state or outbound-slot
//! write a driver makes is fenced by its epoch number, so a superseded
//! driver still tearing down cannot clobber the epoch that replaced it.
//!
//! # Failure Semantics
//!
//! No method returns an error or panics the host. Transport failures
//! drive the reconnect policy, malformed frames are dropped per-message,
//! and an exhausted reconnect budget leaves the client idle until the
//! next explicit `connect()`. Every absorbed failure is reported through
//! the structured fault hook and `tracing`.

use crate::connection_state::{lock, ConnectionManager, ConnectionState};
use crate::fault::{Fault, FaultHook};
use crate::metrics::{state_codes, ClientMetrics};
use crate::observers::{ObserverRegistry, Subscription};
use crate::transport::{Connector, FrameSink, FrameStream};
use astra_feed_core::{codec, AgentEvent, FeedConfig};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// Why a connection epoch ended
enum CloseReason {
    /// The caller asked for it; do not reconnect
    Shutdown,
    /// The peer closed or the transport failed; consult the policy
    Lost,
}

pub(crate) struct ClientInner {
    pub(crate) config: FeedConfig,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) manager: ConnectionManager,
    pub(crate) observers: ObserverRegistry,
    /// Sender into the live connection's write pump, tagged with the
    /// epoch that installed it; `None` while down
    outbound: Mutex<Option<(u64, mpsc::UnboundedSender<String>)>>,
    /// Shutdown signal of the current epoch; `None` before first connect
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    pub(crate) faults: FaultHook,
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl ClientInner {
    pub(crate) fn new(
        config: FeedConfig,
        connector: Arc<dyn Connector>,
        manager: ConnectionManager,
        faults: FaultHook,
        metrics: Option<Arc<ClientMetrics>>,
    ) -> Self {
        Self {
            config,
            connector,
            manager,
            observers: ObserverRegistry::new(),
            outbound: Mutex::new(None),
            shutdown: Mutex::new(None),
            faults,
            metrics,
        }
    }

    fn gauge(&self, code: i64) {
        if let Some(m) = &self.metrics {
            m.update_connection_state(code);
        }
    }

    /// Install `epoch`'s outbound sender unless a newer epoch already
    /// installed its own
    fn set_outbound(&self, epoch: u64, tx: mpsc::UnboundedSender<String>) {
        let mut slot = lock(&self.outbound);
        match slot.as_ref() {
            Some((held, _)) if *held > epoch => {}
            _ => *slot = Some((epoch, tx)),
        }
    }

    /// Remove the outbound sender, but only if it still belongs to
    /// `epoch`; a stale teardown must not steal the live epoch's sender
    fn clear_outbound(&self, epoch: u64) {
        let mut slot = lock(&self.outbound);
        if matches!(slot.as_ref(), Some((held, _)) if *held == epoch) {
            slot.take();
        }
    }

    /// Parse one inbound frame and fan it out; malformed frames are
    /// dropped without touching connection state or the attempt counter
    fn dispatch_frame(&self, frame: &str) {
        match codec::decode_event(frame) {
            Ok(event) => {
                tracing::debug!(agent = %event.agent, level = %event.level, "event received");
                if let Some(m) = &self.metrics {
                    m.record_event(event.level);
                }
                self.observers.dispatch(&event, &self.faults);
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed frame");
                (self.faults)(Fault::MalformedFrame {
                    detail: e.to_string(),
                });
                if let Some(m) = &self.metrics {
                    m.record_dropped_frame();
                    m.record_error("malformed_frame");
                }
            }
        }
    }
}

/// Resilient event client for the Astra-Grid agent feed
///
/// Cheaply cloneable; clones share the connection, registry and
/// configuration. Construct one per endpoint, typically through
/// [`FeedClientBuilder`](crate::FeedClientBuilder).
#[derive(Clone)]
pub struct FeedClient {
    inner: Arc<ClientInner>,
}

impl FeedClient {
    /// Create a client with the production WebSocket transport and the
    /// exponential backoff policy described by `config`
    pub fn new(config: FeedConfig) -> Self {
        crate::builder::FeedClientBuilder::from_config(config).build()
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Start the driver task that owns the connection
    ///
    /// Non-blocking and idempotent-in-intent: if a driver is already
    /// running the call does nothing; otherwise a fresh epoch starts
    /// with a full reconnect budget and the state moves to `Connecting`
    /// before this returns. Failures are not reported here; they drive
    /// the reconnect policy and the fault hook.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut slot = lock(&self.inner.shutdown);
        if let Some(tx) = slot.as_ref() {
            if !tx.is_closed() {
                tracing::debug!("connect ignored, driver already running");
                return;
            }
        }

        let (tx, rx) = watch::channel(false);
        *slot = Some(tx);
        drop(slot);

        let epoch = self.inner.manager.begin_epoch();
        tokio::spawn(drive(Arc::clone(&self.inner), epoch, rx));
    }

    /// Close the connection and cancel any pending reconnect
    ///
    /// A closure caused by this call never triggers the reconnect
    /// algorithm; a later `connect()` is required to resume.
    pub fn disconnect(&self) {
        let tx = lock(&self.inner.shutdown).take();
        if let Some(tx) = tx {
            // Also unblocks a driver parked in a backoff sleep
            let _ = tx.send(true);
        }
        lock(&self.inner.outbound).take();
    }

    /// Serialize and transmit `payload`, only while connected
    ///
    /// A silent no-op otherwise: the payload is dropped, not queued. The
    /// feed offers no outbound durability guarantee by design.
    pub fn send<T: Serialize>(&self, payload: &T) {
        if !self.is_connected() {
            tracing::trace!("send dropped, not connected");
            return;
        }

        match codec::encode(payload) {
            Ok(frame) => {
                if let Some((_, tx)) = lock(&self.inner.outbound).as_ref() {
                    if tx.send(frame).is_ok() {
                        if let Some(m) = &self.inner.metrics {
                            m.record_sent();
                        }
                    }
                }
            }
            Err(e) => {
                (self.inner.faults)(Fault::Serialization {
                    detail: e.to_string(),
                });
                if let Some(m) = &self.inner.metrics {
                    m.record_error("serialization");
                }
            }
        }
    }

    /// Register an observer for every subsequently parsed event
    ///
    /// Events arrive in parse order, delivered in subscription order.
    /// The returned handle cancels exactly this registration; dropping
    /// it without cancelling leaves the subscription active.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(AgentEvent) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(observer)
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.inner.manager.state()
    }

    /// Whether the client is currently connected
    pub fn is_connected(&self) -> bool {
        matches!(self.state(), ConnectionState::Connected)
    }

    /// The endpoint this client connects to
    pub fn url(&self) -> &str {
        &self.inner.config.url
    }
}

/// Driver task: owns the connection for one epoch
///
/// Runs the connect / pump / backoff loop until the caller disconnects,
/// the reconnect budget is spent, or the epoch is superseded by a fresh
/// `connect()`. Every state and outbound-slot write carries `epoch` and
/// is refused once a newer epoch exists, so a stale teardown cannot
/// clobber the live connection.
async fn drive(inner: Arc<ClientInner>, epoch: u64, mut shutdown: watch::Receiver<bool>) {
    loop {
        if !inner.manager.connecting(epoch) {
            return;
        }
        inner.gauge(state_codes::CONNECTING);
        tracing::debug!(url = %inner.config.url, "connecting");

        let attempt_result = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            result = inner.connector.connect(&inner.config.url) => result,
        };

        match attempt_result {
            Ok((sink, stream)) => {
                let was_reconnecting = inner.manager.attempts() > 0;
                if !inner.manager.connected(epoch) {
                    // Superseded mid-handshake; drop the pair and bow out
                    return;
                }
                let (tx, rx) = mpsc::unbounded_channel();
                inner.set_outbound(epoch, tx);
                inner.gauge(state_codes::CONNECTED);
                tracing::info!(url = %inner.config.url, "feed connected");
                if was_reconnecting {
                    if let Some(m) = &inner.metrics {
                        m.record_reconnection_success();
                    }
                }

                let reason = pump(&inner, sink, stream, rx, &mut shutdown).await;
                inner.clear_outbound(epoch);

                match reason {
                    CloseReason::Shutdown => break,
                    CloseReason::Lost => {
                        tracing::warn!("feed connection lost");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "connection attempt failed");
                (inner.faults)(Fault::Transport {
                    detail: e.to_string(),
                });
                if let Some(m) = &inner.metrics {
                    m.record_error("connect");
                }
            }
        }

        match inner.manager.next_reconnect_delay(epoch) {
            Some(delay) => {
                let attempt = inner.manager.attempts();
                tracing::info!(
                    delay_ms = delay.as_millis() as u64,
                    attempt,
                    "scheduling reconnect"
                );
                inner.gauge(state_codes::RECONNECTING);
                if let Some(m) = &inner.metrics {
                    m.record_reconnection_attempt();
                }

                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => {
                if !inner.manager.is_current(epoch) {
                    return;
                }
                let attempts = inner.manager.attempts();
                tracing::error!(attempts, "reconnect budget exhausted, feed abandoned");
                if inner.manager.failed(epoch) {
                    inner.gauge(state_codes::FAILED);
                    (inner.faults)(Fault::ReconnectExhausted { attempts });
                }
                // Terminal-but-silent: the client idles in Failed until
                // the next explicit connect() call
                return;
            }
        }
    }

    if inner.manager.disconnected(epoch) {
        inner.gauge(state_codes::DISCONNECTED);
        tracing::info!("feed disconnected");
    }
}

/// Pump one live connection: deliver inbound frames, write outbound
/// frames, and watch for shutdown
async fn pump(
    inner: &ClientInner,
    mut sink: FrameSink,
    mut stream: FrameStream,
    mut outbound: mpsc::UnboundedReceiver<String>,
    shutdown: &mut watch::Receiver<bool>,
) -> CloseReason {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                let _ = sink.close().await;
                return CloseReason::Shutdown;
            }
            frame = stream.next() => match frame {
                Some(Ok(text)) => inner.dispatch_frame(&text),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "transport error");
                    (inner.faults)(Fault::Transport { detail: e.to_string() });
                    if let Some(m) = &inner.metrics {
                        m.record_error("transport");
                    }
                    return CloseReason::Lost;
                }
                None => {
                    tracing::info!("connection closed by peer");
                    return CloseReason::Lost;
                }
            },
            Some(frame) = outbound.recv() => {
                if let Err(e) = sink.send(frame).await {
                    tracing::warn!(error = %e, "write failed");
                    (inner.faults)(Fault::Transport { detail: e.to_string() });
                    return CloseReason::Lost;
                }
            }
        }
    }
}
