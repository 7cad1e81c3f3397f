// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Test helpers are shared across test binaries; not every file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

pub use sf_core::{DurableBuffer, Forwarder, PublishFuture, RemoteSink, SinkError};
pub use tempfile::TempDir;

/// Sink recording every accepted packet; can be switched offline.
#[derive(Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<Vec<u8>>>>,
    offline: Arc<Mutex<bool>>,
    fail_after: Arc<Mutex<Option<usize>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Vec<u8>> {
        self.published.lock().unwrap().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    /// Accept `n` more packets, then fail until reset with `None`.
    pub fn fail_after(&self, n: Option<usize>) {
        *self.fail_after.lock().unwrap() = n;
    }
}

impl RemoteSink for RecordingSink {
    fn publish<'a>(&'a mut self, packet: &'a [u8]) -> PublishFuture<'a> {
        Box::pin(async move {
            if *self.offline.lock().unwrap() {
                return Err(SinkError::NotConnected);
            }
            let mut budget = self.fail_after.lock().unwrap();
            match *budget {
                Some(0) => return Err(SinkError::SendFailed("injected".into())),
                Some(n) => *budget = Some(n - 1),
                None => {}
            }
            drop(budget);
            self.published.lock().unwrap().push(packet.to_vec());
            Ok(())
        })
    }
}

pub fn bytes(items: &[&str]) -> Vec<Vec<u8>> {
    items.iter().map(|s| s.as_bytes().to_vec()).collect()
}

pub fn buffer_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("packet-storage.jsonl")
}

pub fn forwarder(dir: &TempDir, sink: &RecordingSink) -> Forwarder<RecordingSink> {
    let buffer = DurableBuffer::open(buffer_path(dir)).unwrap();
    Forwarder::new(buffer, sink.clone())
}
