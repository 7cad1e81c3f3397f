// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote link state shared between transport callbacks and the forwarder.
//!
//! Uses atomic fields so the forwarder can read the state before every
//! routing decision without blocking the transport that writes it.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Whether the remote link is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Link {
    /// Remote unreachable; packets are buffered.
    #[default]
    Down,
    /// Remote reachable; packets are forwarded.
    Up,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Down => f.write_str("down"),
            Link::Up => f.write_str("up"),
        }
    }
}

/// Link state visible to both the transport and the forwarder.
#[derive(Debug, Default)]
pub struct LinkState {
    up: AtomicBool,
    /// Number of `Down -> Up` transitions observed.
    reconnects: AtomicU64,
}

impl LinkState {
    /// Create a new state initialized to [`Link::Down`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the link usable. Returns true if this changed the state.
    pub fn set_up(&self) -> bool {
        let was_up = self.up.swap(true, Ordering::AcqRel);
        if !was_up {
            self.reconnects.fetch_add(1, Ordering::Relaxed);
        }
        !was_up
    }

    /// Mark the link unusable. Returns true if this changed the state.
    pub fn set_down(&self) -> bool {
        self.up.swap(false, Ordering::AcqRel)
    }

    /// Check if the link is currently up.
    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }

    /// Get the current state.
    pub fn state(&self) -> Link {
        if self.is_up() {
            Link::Up
        } else {
            Link::Down
        }
    }

    /// Number of times the link came up.
    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
