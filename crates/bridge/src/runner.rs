// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge runner: wires the local source and the remote link into the
//! forwarder.
//!
//! The bridge:
//! 1. Locks and opens the durable buffer (failure here is fatal)
//! 2. Binds the local UDP source
//! 3. Starts the remote connection manager
//! 4. Feeds packets and link events to the forwarder from two tasks
//! 5. Stops on Ctrl-C

use std::fs::File;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sf_core::{DurableBuffer, Forwarder, Link};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, RemoteConfig};
use crate::error::{Error, Result};
use crate::local::LocalSource;
use crate::lock::acquire_lock;
use crate::remote::{ConnectionConfig, ConnectionManager, LinkEvent, WebSocketSink};

type SharedForwarder = Arc<Forwarder<WebSocketSink>>;

/// Pause after a failed local receive so a persistent socket error cannot spin.
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);

impl From<&RemoteConfig> for ConnectionConfig {
    fn from(remote: &RemoteConfig) -> Self {
        ConnectionConfig {
            url: remote.url.clone(),
            client_id: remote.client_id.clone(),
            topic: remote.topic.clone(),
            initial_delay: remote.initial_delay(),
            max_delay: remote.max_delay(),
            stable_after: remote.stable_after(),
            connect_timeout: remote.connect_timeout(),
        }
    }
}

/// A running bridge.
pub struct Bridge {
    forwarder: SharedForwarder,
    local_addr: SocketAddr,
    manager: ConnectionManager,
    tasks: Vec<JoinHandle<()>>,
    _lock: File,
}

impl Bridge {
    /// Start all tasks. Returns once the buffer is open and the source is bound.
    pub async fn start(config: &Config) -> Result<Self> {
        let buffer_path = &config.buffer.path;
        let lock = acquire_lock(buffer_path)?;
        let buffer = DurableBuffer::open(buffer_path)?;

        let pending = buffer.len()?;
        if pending > 0 {
            tracing::info!(pending, path = %buffer_path.display(), "buffer holds packets from a previous run");
        }

        let source = LocalSource::bind(config.local.bind).await?;
        let local_addr = source.local_addr()?;
        tracing::info!(%local_addr, "listening for local packets");

        let sink = WebSocketSink::with_publish_timeout(config.remote.publish_timeout());
        let forwarder = Arc::new(Forwarder::new(buffer, sink.clone()));

        let (manager, events) = ConnectionManager::new((&config.remote).into(), sink);
        let cancel = manager.cancel_token();

        let tasks = vec![
            tokio::spawn(handle_link_events(
                Arc::clone(&forwarder),
                events,
                cancel.clone(),
            )),
            tokio::spawn(handle_packets(Arc::clone(&forwarder), source, cancel)),
            manager.spawn(),
        ];
        tracing::info!(url = %config.remote.url, "connecting to remote");

        Ok(Bridge {
            forwarder,
            local_addr,
            manager,
            tasks,
            _lock: lock,
        })
    }

    /// Address the local source is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current remote link state.
    pub fn link(&self) -> Link {
        self.forwarder.link().state()
    }

    /// Number of packets waiting in the buffer.
    pub async fn backlog_len(&self) -> Result<usize> {
        Ok(self.forwarder.backlog_len().await?)
    }

    /// Stop all tasks and release the buffer lock.
    pub async fn shutdown(self) {
        self.manager.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "bridge task ended abnormally");
            }
        }
        tracing::info!("bridge stopped");
    }
}

/// Run the bridge until Ctrl-C.
pub fn run_bridge(config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    rt.block_on(async {
        let bridge = Bridge::start(config).await?;
        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown requested");
        bridge.shutdown().await;
        Ok(())
    })
}

/// Apply remote link transitions to the forwarder.
async fn handle_link_events(
    forwarder: SharedForwarder,
    mut events: mpsc::Receiver<LinkEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            event = events.recv() => match event {
                Some(event) => event,
                None => return,
            },
        };

        match event {
            LinkEvent::Up => match forwarder.on_connect().await {
                Ok(report) if !report.is_noop() => {
                    tracing::info!(
                        published = report.published,
                        skipped = report.skipped,
                        "backlog delivered"
                    );
                }
                Ok(_) => {}
                Err(e) if e.is_storage() => {
                    tracing::error!(error = %e, "buffer could not be read or cleared");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "backlog drain failed, will retry");
                }
            },
            LinkEvent::Down => forwarder.on_disconnect(),
        }
    }
}

/// Feed local packets to the forwarder in arrival order.
async fn handle_packets(
    forwarder: SharedForwarder,
    mut source: LocalSource,
    cancel: CancellationToken,
) {
    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => return,
            received = source.recv() => received,
        };

        let packet = match received {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!(error = %e, "failed to receive local packet");
                if !pause_or_cancel(RECV_RETRY_DELAY, &cancel).await {
                    return;
                }
                continue;
            }
        };

        if let Err(e) = forwarder.on_packet(&packet).await {
            tracing::error!(error = %e, len = packet.len(), "packet could not be delivered or stored");
        }
    }
}

/// Sleep for `delay`. Returns false if cancelled first.
async fn pause_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
