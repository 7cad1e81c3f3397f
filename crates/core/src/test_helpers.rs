// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sf-core unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::buffer::DurableBuffer;
use crate::sink::{PublishFuture, RemoteSink, SinkError};

/// Mock sink that records published packets.
///
/// Clones share state, so a test keeps one clone to inspect what the
/// forwarder published through the other.
#[derive(Clone, Default)]
pub struct MockSink {
    published: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Scripted results, consumed one per publish. Empty means success.
    script: Arc<Mutex<VecDeque<bool>>>,
    attempts: Arc<Mutex<usize>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results for upcoming publishes: `true` succeeds, `false` fails.
    pub fn script(&self, results: &[bool]) {
        self.script.lock().unwrap().extend(results.iter().copied());
    }

    /// Make the publish at index `n` (0-based, from now) fail.
    pub fn fail_at(&self, n: usize) {
        let mut results = vec![true; n];
        results.push(false);
        self.script(&results);
    }

    pub fn published(&self) -> Vec<Vec<u8>> {
        self.published.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl RemoteSink for MockSink {
    fn publish<'a>(&'a mut self, packet: &'a [u8]) -> PublishFuture<'a> {
        Box::pin(async move {
            *self.attempts.lock().unwrap() += 1;
            let ok = self.script.lock().unwrap().pop_front().unwrap_or(true);
            if ok {
                self.published.lock().unwrap().push(packet.to_vec());
                Ok(())
            } else {
                Err(SinkError::SendFailed("mock failure".into()))
            }
        })
    }
}

/// Open a buffer in a fresh temp dir. Keep the dir alive for the test.
pub fn temp_buffer() -> (TempDir, DurableBuffer) {
    let dir = TempDir::new().unwrap();
    let buffer = DurableBuffer::open(dir.path().join("buffer.jsonl")).unwrap();
    (dir, buffer)
}

pub fn packets(items: &[&str]) -> Vec<Vec<u8>> {
    items.iter().map(|s| s.as_bytes().to_vec()).collect()
}
