// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Forward-or-persist decision for each inbound packet.
//!
//! # Architecture
//!
//! ```text
//! local packets ──► Forwarder::on_packet ──┬─► RemoteSink   (link up)
//!                          ▲               └─► DurableBuffer (link down)
//! link events ─────────────┘ on_connect: drain backlog
//! ```
//!
//! The buffer and the sink sit behind one async mutex. Every append, every
//! drain, and every live publish run while holding it, which keeps the
//! buffer file consistent and stops a live packet from overtaking the
//! backlog.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::buffer::DurableBuffer;
use crate::drain::{drain, DrainReport};
use crate::error::Result;
use crate::link::{Link, LinkState};
use crate::sink::RemoteSink;

/// Why a packet went to the buffer instead of the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferReason {
    /// The link was down.
    LinkDown,
    /// The backlog could not be drained, so the packet queued behind it.
    DrainFailed,
    /// The live publish failed.
    PublishFailed,
}

/// What happened to a packet passed to [`Forwarder::on_packet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Published to the remote sink.
    Forwarded,
    /// Persisted to the durable buffer.
    Buffered(BufferReason),
}

struct Inner<S> {
    buffer: DurableBuffer,
    sink: S,
}

/// Routes packets to the remote sink or the durable buffer.
pub struct Forwarder<S: RemoteSink> {
    link: Arc<LinkState>,
    inner: Mutex<Inner<S>>,
}

impl<S: RemoteSink> Forwarder<S> {
    /// Create a forwarder with its own link state, initially down.
    pub fn new(buffer: DurableBuffer, sink: S) -> Self {
        Self::with_link(buffer, sink, Arc::new(LinkState::new()))
    }

    /// Create a forwarder that reads an externally shared link state.
    pub fn with_link(buffer: DurableBuffer, sink: S, link: Arc<LinkState>) -> Self {
        Forwarder {
            link,
            inner: Mutex::new(Inner { buffer, sink }),
        }
    }

    /// The link state this forwarder consults.
    pub fn link(&self) -> &Arc<LinkState> {
        &self.link
    }

    /// Handle one inbound packet.
    ///
    /// Errors only when the packet could be neither delivered nor persisted.
    pub async fn on_packet(&self, packet: &[u8]) -> Result<Delivery> {
        let mut inner = self.inner.lock().await;
        let Inner { buffer, sink } = &mut *inner;

        if self.link.state() == Link::Down {
            buffer.append(packet)?;
            tracing::debug!(len = packet.len(), "link down, packet buffered");
            return Ok(Delivery::Buffered(BufferReason::LinkDown));
        }

        if let Err(e) = drain(buffer, sink).await {
            tracing::warn!(error = %e, "backlog drain failed, buffering live packet");
            buffer.append(packet)?;
            return Ok(Delivery::Buffered(BufferReason::DrainFailed));
        }

        match sink.publish(packet).await {
            Ok(()) => {
                tracing::debug!(len = packet.len(), "packet forwarded");
                Ok(Delivery::Forwarded)
            }
            Err(e) => {
                tracing::warn!(error = %e, "publish failed, buffering packet");
                buffer.append(packet)?;
                Ok(Delivery::Buffered(BufferReason::PublishFailed))
            }
        }
    }

    /// Remote transport connected: mark the link up and flush the backlog.
    pub async fn on_connect(&self) -> Result<DrainReport> {
        if self.link.set_up() {
            tracing::info!(reconnects = self.link.reconnects(), "remote link up");
        }
        self.drain().await
    }

    /// Remote transport disconnected: subsequent packets are buffered.
    pub fn on_disconnect(&self) {
        if self.link.set_down() {
            tracing::info!("remote link down, buffering packets");
        }
    }

    /// Run the drain protocol now.
    pub async fn drain(&self) -> Result<DrainReport> {
        let mut inner = self.inner.lock().await;
        let Inner { buffer, sink } = &mut *inner;
        drain(buffer, sink).await
    }

    /// Number of records currently buffered.
    pub async fn backlog_len(&self) -> Result<usize> {
        self.inner.lock().await.buffer.len()
    }
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
