// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background connection management for the remote link.
//!
//! A single task connects with exponential backoff, installs the connection
//! into the shared [`WebSocketSink`], and reports link transitions through a
//! channel. The channel exists before the task is spawned, so no transition
//! can be fired before someone is listening.

use std::time::Duration;

use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::websocket::{Announce, WebSocketSink, WsStream};

/// Link transitions reported to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connection is installed in the sink.
    Up,
    /// The installed connection was lost.
    Down,
}

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// URL to connect to.
    pub url: String,
    /// Announced client id.
    pub client_id: String,
    /// Announced topic.
    pub topic: String,
    /// First delay after a failure.
    pub initial_delay: Duration,
    /// Delay cap.
    pub max_delay: Duration,
    /// Connections lasting at least this long reset the backoff.
    pub stable_after: Duration,
    /// Limit on the TCP connect plus WebSocket handshake.
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080".to_string(),
            client_id: "basicPubSub".to_string(),
            topic: "sdk/test/Python".to_string(),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            stable_after: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Exponential backoff with a cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    next: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            next: initial.min(max),
        }
    }

    /// Delay to wait now; doubles the following one up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.next = self.initial.min(self.max);
    }
}

/// Manages the background connection task.
pub struct ConnectionManager {
    config: ConnectionConfig,
    sink: WebSocketSink,
    event_tx: mpsc::Sender<LinkEvent>,
    cancel_token: CancellationToken,
}

impl ConnectionManager {
    /// Create a new connection manager.
    ///
    /// Returns the manager and a receiver for link events.
    pub fn new(
        config: ConnectionConfig,
        sink: WebSocketSink,
    ) -> (Self, mpsc::Receiver<LinkEvent>) {
        let (event_tx, event_rx) = mpsc::channel(16);
        let manager = Self {
            config,
            sink,
            event_tx,
            cancel_token: CancellationToken::new(),
        };
        (manager, event_rx)
    }

    /// Token cancelled when the manager is told to stop.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start the connect/reconnect loop.
    pub fn spawn(&self) -> tokio::task::JoinHandle<()> {
        let config = self.config.clone();
        let sink = self.sink.clone();
        let event_tx = self.event_tx.clone();
        let cancel_token = self.cancel_token.clone();

        tokio::spawn(async move {
            connection_loop(config, sink, event_tx, cancel_token).await;
        })
    }

    /// Stop the loop and drop any live connection.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }
}

/// Connect, hold the connection until it drops, reconnect. Runs until cancelled.
async fn connection_loop(
    config: ConnectionConfig,
    sink: WebSocketSink,
    event_tx: mpsc::Sender<LinkEvent>,
    cancel_token: CancellationToken,
) {
    let announce = Announce::hello(&config.client_id, &config.topic);
    let mut backoff = Backoff::new(config.initial_delay, config.max_delay);
    let mut attempt = 0u32;

    loop {
        attempt = attempt.saturating_add(1);

        let connect = tokio::time::timeout(
            config.connect_timeout,
            tokio_tungstenite::connect_async(&config.url),
        );
        let connect_result = tokio::select! {
            _ = cancel_token.cancelled() => return,
            result = connect => result,
        };

        match connect_result {
            Ok(Ok((ws, _))) => {
                let (writer, mut reader) = ws.split();
                let broken = match sink.install(writer, &announce).await {
                    Ok(broken) => broken,
                    Err(e) => {
                        tracing::warn!(url = %config.url, error = %e, "remote rejected announce");
                        if !wait_or_cancel(&mut backoff, &cancel_token).await {
                            return;
                        }
                        continue;
                    }
                };

                tracing::info!(url = %config.url, attempt, "connected to remote");
                attempt = 0;
                let connected_at = Instant::now();

                if event_tx.send(LinkEvent::Up).await.is_err() {
                    sink.detach().await;
                    return;
                }

                let reason = tokio::select! {
                    _ = cancel_token.cancelled() => {
                        sink.detach().await;
                        return;
                    }
                    _ = broken.cancelled() => "publish failed".to_string(),
                    reason = watch_until_closed(&mut reader) => reason,
                };

                sink.detach().await;
                tracing::warn!(url = %config.url, %reason, "remote connection lost");
                if event_tx.send(LinkEvent::Down).await.is_err() {
                    return;
                }

                if connected_at.elapsed() >= config.stable_after {
                    backoff.reset();
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %config.url, attempt, error = %e, "connect failed");
            }
            Err(_) => {
                tracing::debug!(
                    url = %config.url,
                    attempt,
                    timeout_ms = config.connect_timeout.as_millis() as u64,
                    "connect timed out"
                );
            }
        }

        if !wait_or_cancel(&mut backoff, &cancel_token).await {
            return;
        }
    }
}

/// Sleep for the next backoff delay. Returns false if cancelled first.
async fn wait_or_cancel(backoff: &mut Backoff, cancel_token: &CancellationToken) -> bool {
    let delay = backoff.next_delay();
    tokio::select! {
        _ = cancel_token.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Read frames until the connection ends; returns why it ended.
async fn watch_until_closed(reader: &mut SplitStream<WsStream>) -> String {
    loop {
        match reader.next().await {
            Some(Ok(Message::Close(_))) => return "closed by remote".to_string(),
            Some(Ok(_)) => {
                // Ignore other message types
                continue;
            }
            Some(Err(e)) => return e.to_string(),
            None => return "stream ended".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
