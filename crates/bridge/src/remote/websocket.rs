// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket implementation of the remote sink.
//!
//! After connecting, the bridge sends one JSON text frame announcing itself:
//!
//! ```text
//! {"type":"hello","client_id":"basicPubSub","topic":"sdk/test/Python"}
//! ```
//!
//! Every packet is then sent as one binary frame carrying the payload
//! verbatim. A send that does not complete within the publish timeout
//! fails and drops the connection, so a stalled peer cannot hold the
//! forwarder.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use serde::{Deserialize, Serialize};
use sf_core::{PublishFuture, RemoteSink, SinkError};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsWriter = SplitSink<WsStream, Message>;

/// First frame sent on every new connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Announce {
    Hello { client_id: String, topic: String },
}

impl Announce {
    pub fn hello(client_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Announce::Hello {
            client_id: client_id.into(),
            topic: topic.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Default time allowed for one frame send.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// The installed connection and the signal raised when a send on it fails.
struct Installed {
    writer: WsWriter,
    broken: CancellationToken,
}

/// Remote sink publishing over the currently installed WebSocket connection.
///
/// Clones share the connection slot: the connection manager installs and
/// removes the writer, the forwarder publishes through its own clone.
#[derive(Clone)]
pub struct WebSocketSink {
    slot: Arc<Mutex<Option<Installed>>>,
    publish_timeout: Duration,
}

impl Default for WebSocketSink {
    fn default() -> Self {
        Self::with_publish_timeout(DEFAULT_PUBLISH_TIMEOUT)
    }
}

impl WebSocketSink {
    /// Create a sink with no connection installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink whose sends fail after `publish_timeout`.
    pub fn with_publish_timeout(publish_timeout: Duration) -> Self {
        WebSocketSink {
            slot: Arc::new(Mutex::new(None)),
            publish_timeout,
        }
    }

    /// Install a freshly connected writer, announcing the bridge first.
    ///
    /// The returned token is cancelled when a publish on this connection
    /// fails and the sink drops it.
    pub(crate) async fn install(
        &self,
        mut writer: WsWriter,
        announce: &Announce,
    ) -> Result<CancellationToken, SinkError> {
        let json = announce
            .to_json()
            .map_err(|e| SinkError::SendFailed(e.to_string()))?;
        send_within(
            &mut writer,
            Message::Text(json.into()),
            self.publish_timeout,
        )
        .await?;

        let broken = CancellationToken::new();
        *self.slot.lock().await = Some(Installed {
            writer,
            broken: broken.clone(),
        });
        Ok(broken)
    }

    /// Drop the current connection, if any.
    pub(crate) async fn detach(&self) {
        if let Some(mut installed) = self.slot.lock().await.take() {
            let _ = tokio::time::timeout(self.publish_timeout, installed.writer.close()).await;
        }
    }

    /// Check if a connection is installed.
    pub async fn is_attached(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

impl RemoteSink for WebSocketSink {
    fn publish<'a>(&'a mut self, packet: &'a [u8]) -> PublishFuture<'a> {
        Box::pin(async move {
            let mut slot = self.slot.lock().await;
            let installed = slot.as_mut().ok_or(SinkError::NotConnected)?;

            let frame = Message::Binary(packet.to_vec().into());
            if let Err(e) = send_within(&mut installed.writer, frame, self.publish_timeout).await {
                // Connection is broken or stalled, drop it and tell the manager
                if let Some(installed) = slot.take() {
                    installed.broken.cancel();
                }
                return Err(e);
            }

            Ok(())
        })
    }
}

async fn send_within(
    writer: &mut WsWriter,
    message: Message,
    limit: Duration,
) -> Result<(), SinkError> {
    match tokio::time::timeout(limit, writer.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(SinkError::SendFailed(e.to_string())),
        Err(_) => Err(SinkError::SendFailed(format!(
            "send timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
#[path = "websocket_tests.rs"]
mod tests;
