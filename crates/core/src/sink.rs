// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote sink abstraction.
//!
//! The forwarder publishes live packets and replayed backlog through the
//! same [`RemoteSink`], so a real broker connection and a test double are
//! interchangeable.

use std::future::Future;
use std::pin::Pin;

/// Error type for sink operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// No remote connection is currently installed.
    #[error("not connected to remote")]
    NotConnected,

    /// The remote transport rejected or failed to send the packet.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Boxed future returned by [`RemoteSink::publish`].
pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = SinkResult<()>> + Send + 'a>>;

/// Publish side of the remote transport.
///
/// `publish` returning `Ok` means the transport accepted the packet; the
/// forwarder treats that as handed off for at-least-once purposes.
pub trait RemoteSink: Send {
    /// Publish one opaque packet to the remote destination.
    fn publish<'a>(&'a mut self, packet: &'a [u8]) -> PublishFuture<'a>;
}

impl<S: RemoteSink + ?Sized> RemoteSink for Box<S> {
    fn publish<'a>(&'a mut self, packet: &'a [u8]) -> PublishFuture<'a> {
        (**self).publish(packet)
    }
}
