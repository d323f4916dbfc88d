//! Common test utilities for feed client integration tests
//!
//! Two kinds of doubles live here:
//!
//! - [`MockWsServer`]: a real WebSocket listener for end-to-end tests
//!   over localhost sockets
//! - [`ScriptedConnector`] / [`RefusingConnector`]: in-memory connectors
//!   injected through the builder so reconnect timing runs
//!   deterministically under tokio's paused clock

#![allow(dead_code)]

use astra_feed_client::{Connector, FrameSink, FrameStream, TransportPair};
use astra_feed_core::Error;
use futures::future::{self, FutureExt};
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Mock WebSocket server for socket-level client tests
///
/// Accepts any number of connections. Frames pushed with [`push`] are
/// broadcast to every live connection; frames sent by clients arrive on
/// [`recv`].
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    frame_tx: broadcast::Sender<String>,
    received_rx: mpsc::Receiver<String>,
    connections: Arc<AtomicUsize>,
}

impl MockWsServer {
    /// Bind a listener on an ephemeral port and start accepting
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (frame_tx, _) = broadcast::channel::<String>(64);
        let (received_tx, received_rx) = mpsc::channel::<String>(100);
        let connections = Arc::new(AtomicUsize::new(0));

        let accept_frame_tx = frame_tx.clone();
        let accept_connections = Arc::clone(&connections);
        let mut accept_shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = accept_shutdown.changed() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { break };
                        accept_connections.fetch_add(1, Ordering::SeqCst);

                        let mut frame_rx = accept_frame_tx.subscribe();
                        let received_tx = received_tx.clone();
                        let mut conn_shutdown = shutdown_rx.clone();
                        tokio::spawn(async move {
                            let Ok(ws_stream) = accept_async(stream).await else {
                                return;
                            };
                            let (mut write, mut read) = ws_stream.split();

                            loop {
                                tokio::select! {
                                    _ = conn_shutdown.changed() => break,
                                    frame = frame_rx.recv() => {
                                        let Ok(frame) = frame else { break };
                                        if write.send(Message::Text(frame)).await.is_err() {
                                            break;
                                        }
                                    }
                                    msg = read.next() => match msg {
                                        Some(Ok(Message::Text(text))) => {
                                            let _ = received_tx.send(text).await;
                                        }
                                        Some(Ok(Message::Close(_))) | None => break,
                                        Some(Ok(_)) => {}
                                        Some(Err(_)) => break,
                                    },
                                }
                            }
                        });
                    }
                }
            }
        });

        // Let the accept loop come up before handing out the URL
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            addr,
            shutdown_tx,
            frame_tx,
            received_rx,
            connections,
        }
    }

    /// WebSocket URL for connecting to this server
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Broadcast one text frame to every live connection
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.frame_tx.send(frame.into());
    }

    /// Wait up to five seconds for a frame sent by a client
    pub async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.received_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Wait a short bounded period for a frame, `None` when silent
    pub async fn recv_within(&mut self, wait: Duration) -> Option<String> {
        tokio::time::timeout(wait, self.received_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Stop the listener and drop every live connection
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Connector that refuses every attempt and records when each came in
///
/// Timestamps use tokio's clock, so under `start_paused` tests the gaps
/// between entries are exactly the backoff delays.
pub struct RefusingConnector {
    pub attempts: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl RefusingConnector {
    pub fn new() -> (Arc<Self>, Arc<Mutex<Vec<tokio::time::Instant>>>) {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let connector = Arc::new(Self {
            attempts: Arc::clone(&attempts),
        });
        (connector, attempts)
    }
}

impl Connector for RefusingConnector {
    fn connect(&self, _url: &str) -> future::BoxFuture<'static, astra_feed_core::Result<TransportPair>> {
        self.attempts.lock().unwrap().push(tokio::time::Instant::now());
        future::ready(Err(Error::WebSocket("connection refused".to_string()))).boxed()
    }
}

/// Far end of one in-memory connection handed out by [`ScriptedConnector`]
///
/// Dropping `to_client` (or the whole handle) ends the client's inbound
/// stream, which the client treats as an unexpected closure.
pub struct ServerEnd {
    pub to_client: futures::channel::mpsc::UnboundedSender<astra_feed_core::Result<String>>,
    pub from_client: futures::channel::mpsc::UnboundedReceiver<String>,
}

impl ServerEnd {
    /// Push one frame to the connected client
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.to_client.unbounded_send(Ok(frame.into()));
    }
}

/// One scripted connection outcome
pub enum Outcome {
    /// Refuse the attempt
    Refuse,
    /// Accept and hand the test a [`ServerEnd`] to drive
    Accept,
}

/// Connector driven by a script of accept/refuse outcomes
///
/// Records attempt timestamps like [`RefusingConnector`]; accepted
/// connections park their server ends in `server_ends` for the test to
/// push frames through or drop. An exhausted script refuses.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<Outcome>>,
    pub attempts: Arc<Mutex<Vec<tokio::time::Instant>>>,
    pub server_ends: Arc<Mutex<Vec<ServerEnd>>>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            attempts: Arc::new(Mutex::new(Vec::new())),
            server_ends: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn open_pair(&self) -> TransportPair {
        let (to_client_tx, to_client_rx) =
            futures::channel::mpsc::unbounded::<astra_feed_core::Result<String>>();
        let (from_client_tx, from_client_rx) = futures::channel::mpsc::unbounded::<String>();

        self.server_ends.lock().unwrap().push(ServerEnd {
            to_client: to_client_tx,
            from_client: from_client_rx,
        });

        let sink: FrameSink =
            Box::pin(from_client_tx.sink_map_err(|e| Error::WebSocket(e.to_string())));
        let stream: FrameStream = Box::pin(to_client_rx);
        (sink, stream)
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, _url: &str) -> future::BoxFuture<'static, astra_feed_core::Result<TransportPair>> {
        self.attempts.lock().unwrap().push(tokio::time::Instant::now());

        let outcome = self.script.lock().unwrap().pop_front();
        let result = match outcome {
            Some(Outcome::Accept) => Ok(self.open_pair()),
            Some(Outcome::Refuse) | None => {
                Err(Error::WebSocket("connection refused".to_string()))
            }
        };
        future::ready(result).boxed()
    }
}

/// Poll `predicate` until it holds or `wait` elapses
pub async fn wait_for(wait: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + wait;
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}
