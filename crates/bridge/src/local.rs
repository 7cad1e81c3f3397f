// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local packet source: one UDP datagram is one packet.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// Largest payload a UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM: usize = 65_507;

/// UDP socket the local sensor publisher sends to.
pub struct LocalSource {
    socket: UdpSocket,
    scratch: Vec<u8>,
}

impl LocalSource {
    /// Bind the source socket.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(LocalSource {
            socket,
            scratch: vec![0u8; MAX_DATAGRAM],
        })
    }

    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the next non-empty packet.
    pub async fn recv(&mut self) -> io::Result<Vec<u8>> {
        loop {
            let (len, peer) = self.socket.recv_from(&mut self.scratch).await?;
            if len == 0 {
                tracing::debug!(%peer, "ignoring empty datagram");
                continue;
            }
            return Ok(self.scratch[..len].to_vec());
        }
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
