// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable buffer for packets received while the remote link is down.
//!
//! Uses JSONL format for durability - each packet is written as a single
//! line and fsynced immediately. On reconnect the backlog is read back in
//! append order and the file is truncated only after every packet has been
//! republished.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::record::Record;

/// Packets read back from the buffer, in append order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Backlog {
    /// Payloads of every readable record.
    pub packets: Vec<Vec<u8>>,
    /// Lines that could not be decoded and were skipped.
    pub skipped: usize,
}

/// Append-only packet store backed by a single file.
///
/// Not internally synchronized: the forwarder owns it behind one lock so
/// that an append can never land between `drain_all` and `clear`.
#[derive(Debug)]
pub struct DurableBuffer {
    /// Path to the buffer file.
    path: PathBuf,
}

impl DurableBuffer {
    /// Create or open the buffer at the given path.
    ///
    /// A torn final line left by a crash mid-append is terminated so the
    /// next append starts on a fresh line.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        if seal_torn_tail(&mut file)? {
            tracing::warn!(path = %path.display(), "terminated torn record at end of buffer");
        }

        Ok(DurableBuffer { path })
    }

    /// Returns the path to the buffer file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one packet and fsync.
    ///
    /// On error the packet must be treated as not persisted. A write that
    /// fails partway is truncated back off the file, and a fragment left by
    /// an earlier failure is terminated first, so the record always lands
    /// on its own line.
    pub fn append(&mut self, packet: &[u8]) -> Result<()> {
        let line = Record::new(packet).to_line()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if seal_torn_tail(&mut file)? {
            tracing::warn!(path = %self.path.display(), "terminated torn record before append");
        }

        let prev_len = file.metadata()?.len();
        if let Err(e) = write_synced(&mut file, line.as_bytes()) {
            if let Err(rollback) = file.set_len(prev_len) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial append"
                );
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Check if the buffer holds no records.
    ///
    /// An empty file is detected from metadata alone.
    pub fn is_empty(&self) -> Result<bool> {
        let len = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        if len == 0 {
            return Ok(true);
        }
        Ok(self.len()? == 0)
    }

    /// Number of stored lines, including ones that would fail to decode.
    pub fn len(&self) -> Result<usize> {
        count_records(&self.path)
    }

    /// Read every stored packet in append order without removing anything.
    ///
    /// Malformed lines are logged and skipped; the valid records around them
    /// are still returned.
    pub fn drain_all(&self) -> Result<Backlog> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Backlog::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut backlog = Backlog::default();
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let bytes = line?;
            let text = String::from_utf8_lossy(&bytes);
            if text.trim().is_empty() {
                continue;
            }
            match Record::from_line(&text, idx + 1) {
                Ok(record) => backlog.packets.push(record.data),
                Err(Error::MalformedRecord { line, reason }) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line,
                        %reason,
                        "skipping malformed buffer record"
                    );
                    backlog.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(backlog)
    }

    /// Truncate the buffer to empty.
    ///
    /// Call this only after every packet from the preceding `drain_all`
    /// was accepted by the remote sink. Idempotent.
    pub fn clear(&mut self) -> Result<()> {
        let file = File::create(&self.path)?;
        file.sync_all()?;
        Ok(())
    }
}

/// Count stored lines in a buffer file without opening it for writing.
///
/// A missing file counts as empty.
pub fn count_records(path: &Path) -> Result<usize> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut count = 0;
    for line in BufReader::new(file).split(b'\n') {
        if !line?.iter().all(u8::is_ascii_whitespace) {
            count += 1;
        }
    }
    Ok(count)
}

fn write_synced(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.sync_all()
}

/// Append a newline if the file is non-empty and does not end with one.
fn seal_torn_tail(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(false);
    }

    file.write_all(b"\n")?;
    file.sync_all()?;
    Ok(true)
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
