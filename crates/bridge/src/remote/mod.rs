// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote broker link.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐ install/detach ┌───────────────┐  publish  ┌────────────┐
//! │ ConnectionManager │───────────────►│ WebSocketSink │◄──────────│ Forwarder  │
//! │  (backoff task)   │                └───────────────┘           └────────────┘
//! └───────────────────┘                                                  ▲
//!          │ LinkEvent::{Up, Down}                                       │
//!          └─────────────────────────────────────────────────────────────┘
//! ```

mod connection;
mod websocket;

pub use connection::{Backoff, ConnectionConfig, ConnectionManager, LinkEvent};
pub use websocket::{Announce, WebSocketSink};
