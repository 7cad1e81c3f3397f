// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backlog replay on reconnect.
//!
//! The buffer is cleared only after every stored packet was accepted by the
//! sink. A failed publish leaves the whole backlog in place, so packets
//! published before the failure are sent again on the next drain.

use crate::buffer::DurableBuffer;
use crate::error::{Error, Result};
use crate::sink::RemoteSink;

/// Outcome of a drain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Packets republished to the sink.
    pub published: usize,
    /// Malformed records dropped from the buffer.
    pub skipped: usize,
}

impl DrainReport {
    /// True when the buffer was empty and nothing was touched.
    pub fn is_noop(&self) -> bool {
        self.published == 0 && self.skipped == 0
    }
}

/// Republish the whole backlog in order, then clear the buffer.
pub async fn drain<S>(buffer: &mut DurableBuffer, sink: &mut S) -> Result<DrainReport>
where
    S: RemoteSink + ?Sized,
{
    if buffer.is_empty()? {
        return Ok(DrainReport::default());
    }

    let backlog = buffer.drain_all()?;
    let total = backlog.packets.len();
    tracing::info!(total, skipped = backlog.skipped, "draining buffered packets");

    for (published, packet) in backlog.packets.iter().enumerate() {
        if let Err(source) = sink.publish(packet).await {
            return Err(Error::PartialDrain {
                published,
                total,
                source,
            });
        }
    }

    buffer.clear()?;
    tracing::info!(published = total, "drain complete, buffer cleared");

    Ok(DrainReport {
        published: total,
        skipped: backlog.skipped,
    })
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
