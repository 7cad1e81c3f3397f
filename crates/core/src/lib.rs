// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sf-core: store-and-forward core for the sensor bridge
//!
//! Packets arriving while the remote link is up are published straight
//! through a [`RemoteSink`]. While it is down they are appended to a
//! [`DurableBuffer`], and the backlog is replayed in order when the link
//! comes back. Delivery is at-least-once: a failed replay keeps the whole
//! backlog for the next attempt.

pub mod buffer;
pub mod drain;
pub mod error;
pub mod forward;
pub mod link;
pub mod record;
pub mod sink;

pub use buffer::{count_records, Backlog, DurableBuffer};
pub use drain::{drain, DrainReport};
pub use error::{Error, Result};
pub use forward::{BufferReason, Delivery, Forwarder};
pub use link::{Link, LinkState};
pub use record::Record;
pub use sink::{PublishFuture, RemoteSink, SinkError, SinkResult};

#[cfg(test)]
mod test_helpers;
