// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use sf_core::DurableBuffer;
use tempfile::TempDir;

fn config_with_buffer(dir: &TempDir) -> Config {
    Config::default().with_overrides(Overrides {
        buffer: Some(dir.path().join("packets.jsonl")),
        ..Overrides::default()
    })
}

#[test]
fn status_on_missing_buffer_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = config_with_buffer(&dir);

    status(&config).unwrap();

    assert!(!config.buffer.path.exists(), "status must not create the buffer");
}

#[test]
fn status_leaves_buffer_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config_with_buffer(&dir);
    let mut buffer = DurableBuffer::open(&config.buffer.path).unwrap();
    buffer.append(b"one").unwrap();
    buffer.append(b"two").unwrap();
    let before = std::fs::read(&config.buffer.path).unwrap();

    status(&config).unwrap();

    assert_eq!(std::fs::read(&config.buffer.path).unwrap(), before);
}

#[test]
fn run_rejects_missing_endpoint_before_binding() {
    let dir = TempDir::new().unwrap();
    let args = RunArgs {
        buffer: Some(dir.path().join("packets.jsonl")),
        ..RunArgs::default()
    };

    let err = run(Command::Run(args)).unwrap_err();

    assert!(err.to_string().contains("remote url is required"));
    assert!(!dir.path().join("packets.jsonl").exists());
}
