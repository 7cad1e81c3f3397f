// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk record format for buffered packets.
//!
//! Each record is one JSON line. The payload is base64-encoded so the line
//! separator can never appear inside it:
//!
//! ```text
//! {"at":"2026-10-15T12:00:00.123Z","data":"aGVsbG8="}
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One persisted packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// When the packet was written to the buffer. Diagnostic only.
    pub at: DateTime<Utc>,
    /// The verbatim packet payload.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Record {
            at: Utc::now(),
            data: data.into(),
        }
    }

    /// Encode as a single line, including the trailing newline.
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode one line. `line_no` is 1-based and only used for error reporting.
    pub fn from_line(line: &str, line_no: usize) -> Result<Self> {
        serde_json::from_str(line.trim_end()).map_err(|e| Error::MalformedRecord {
            line: line_no,
            reason: e.to_string(),
        })
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
