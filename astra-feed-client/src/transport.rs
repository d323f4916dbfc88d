//! Transport abstraction for the feed connection
//!
//! The reconnect and delivery logic never touches a socket directly: it
//! asks a [`Connector`] for a pair of text-frame halves and works against
//! those. Production uses [`WsConnector`], which wraps
//! `tokio-tungstenite`; tests inject channel-backed connectors so backoff
//! timing and dispatch order can be verified without real sockets or
//! real time.

use astra_feed_core::{Error, Result};
use futures::future::BoxFuture;
use futures::{future, Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Write half of a feed connection: one JSON text frame per item
pub type FrameSink = Pin<Box<dyn Sink<String, Error = Error> + Send>>;

/// Read half of a feed connection: one JSON text frame per item
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// The two halves of an established connection
pub type TransportPair = (FrameSink, FrameStream);

/// Establishes feed connections
///
/// One `connect` call corresponds to one connection attempt; the driver
/// owns the returned halves until the stream ends or errors, then asks
/// the reconnect policy whether to call `connect` again.
pub trait Connector: Send + Sync {
    /// Attempt to open a connection to `url`
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<TransportPair>>;
}

/// WebSocket connector used in production
///
/// Maps text frames straight through and discards binary, ping and pong
/// frames (the socket layer answers pings itself). A close frame ends
/// the stream, which the driver treats as an unexpected closure.
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<TransportPair>> {
        let url = url.to_string();
        Box::pin(async move {
            let (ws_stream, _) = connect_async(&url)
                .await
                .map_err(|e| Error::WebSocket(e.to_string()))?;

            let (sink, stream) = ws_stream.split();

            let sink = sink
                .sink_map_err(|e| Error::WebSocket(e.to_string()))
                .with(|text: String| future::ready(Ok::<Message, Error>(Message::Text(text))));

            let stream = stream.filter_map(|frame| {
                future::ready(match frame {
                    Ok(Message::Text(text)) => Some(Ok(text)),
                    Ok(_) => None,
                    Err(e) => Some(Err(Error::WebSocket(e.to_string()))),
                })
            });

            let sink: FrameSink = Box::pin(sink);
            let stream: FrameStream = Box::pin(stream);
            Ok((sink, stream))
        })
    }
}
