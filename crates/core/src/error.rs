// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sf-core operations.

use thiserror::Error;

use crate::sink::SinkError;

/// All possible errors that can occur in sf-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("remote sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("drain stopped after {published} of {total} packets: {source}\n  hint: the backlog is kept and retried on the next reconnect")]
    PartialDrain {
        published: usize,
        total: usize,
        #[source]
        source: SinkError,
    },

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

impl Error {
    /// True for errors that leave a packet unpersisted on local storage.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Json(_))
    }
}

/// A specialized Result type for sf-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
