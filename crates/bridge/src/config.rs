// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge configuration.
//!
//! Configuration is read from an optional TOML file and then overridden by
//! command-line flags:
//!
//! ```toml
//! [local]
//! bind = "127.0.0.1:1700"
//!
//! [remote]
//! url = "ws://broker.example:8080/ingest"
//! client_id = "basicPubSub"
//! topic = "sdk/test/Python"
//! connect_timeout_ms = 10000
//! publish_timeout_ms = 5000
//!
//! [buffer]
//! path = "packet-storage.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Full bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
}

/// Where sensor packets arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// UDP address to receive packets on (default: 127.0.0.1:1700).
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for LocalConfig {
    fn default() -> Self {
        LocalConfig {
            bind: default_bind(),
        }
    }
}

/// Remote broker connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket endpoint. Required, from the file or `--endpoint`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Client identifier announced to the remote (default: "basicPubSub").
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Topic announced to the remote (default: "sdk/test/Python").
    #[serde(default = "default_topic")]
    pub topic: String,
    /// First reconnect delay in milliseconds (default: 1000).
    #[serde(default = "default_reconnect_initial_delay_ms")]
    pub reconnect_initial_delay_ms: u64,
    /// Reconnect delay cap in seconds (default: 32).
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub reconnect_max_delay_secs: u64,
    /// A connection that stays up this long resets the backoff (default: 20).
    #[serde(default = "default_stable_connection_secs")]
    pub stable_connection_secs: u64,
    /// Time allowed for the connect and WebSocket handshake in milliseconds (default: 10000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Time allowed for one packet send in milliseconds (default: 5000).
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: String::new(),
            client_id: default_client_id(),
            topic: default_topic(),
            reconnect_initial_delay_ms: default_reconnect_initial_delay_ms(),
            reconnect_max_delay_secs: default_reconnect_max_delay_secs(),
            stable_connection_secs: default_stable_connection_secs(),
            connect_timeout_ms: default_connect_timeout_ms(),
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}

impl RemoteConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_max_delay_secs)
    }

    pub fn stable_after(&self) -> Duration {
        Duration::from_secs(self.stable_connection_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Durable buffer location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Buffer file (default: "packet-storage.jsonl").
    #[serde(default = "default_buffer_path")]
    pub path: PathBuf,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            path: default_buffer_path(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 1700))
}

fn default_client_id() -> String {
    "basicPubSub".to_string()
}

fn default_topic() -> String {
    "sdk/test/Python".to_string()
}

fn default_reconnect_initial_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_secs() -> u64 {
    32
}

fn default_stable_connection_secs() -> u64 {
    20
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_publish_timeout_ms() -> u64 {
    5_000
}

fn default_buffer_path() -> PathBuf {
    PathBuf::from("packet-storage.jsonl")
}

/// Values from the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub client_id: Option<String>,
    pub topic: Option<String>,
    pub bind: Option<SocketAddr>,
    pub buffer: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load the file if given, otherwise start from defaults, then apply overrides.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let config = match path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(config.with_overrides(overrides))
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.endpoint {
            self.remote.url = url;
        }
        if let Some(client_id) = overrides.client_id {
            self.remote.client_id = client_id;
        }
        if let Some(topic) = overrides.topic {
            self.remote.topic = topic;
        }
        if let Some(bind) = overrides.bind {
            self.local.bind = bind;
        }
        if let Some(path) = overrides.buffer {
            self.buffer.path = path;
        }
        self
    }

    /// Check everything `run` needs before touching the network.
    pub fn validate(&self) -> Result<()> {
        let remote = &self.remote;

        if remote.url.is_empty() {
            return Err(Error::Config(
                "remote url is required\n  hint: pass --endpoint or set remote.url".to_string(),
            ));
        }
        if remote.url.starts_with("wss://") {
            return Err(Error::Config(format!(
                "unsupported remote url '{}'\n  hint: TLS is terminated outside the bridge; use ws://",
                remote.url
            )));
        }
        if !remote.url.starts_with("ws://") {
            return Err(Error::Config(format!(
                "invalid remote url '{}': must start with ws://",
                remote.url
            )));
        }
        if remote.client_id.trim().is_empty() {
            return Err(Error::Config("client_id cannot be empty".to_string()));
        }
        if remote.topic.trim().is_empty() {
            return Err(Error::Config("topic cannot be empty".to_string()));
        }
        if remote.reconnect_initial_delay_ms == 0 {
            return Err(Error::Config(
                "reconnect_initial_delay_ms must be positive".to_string(),
            ));
        }
        if remote.initial_delay() > remote.max_delay() {
            return Err(Error::Config(format!(
                "reconnect_initial_delay_ms ({}) exceeds reconnect_max_delay_secs ({})",
                remote.reconnect_initial_delay_ms, remote.reconnect_max_delay_secs
            )));
        }
        if remote.connect_timeout_ms == 0 || remote.publish_timeout_ms == 0 {
            return Err(Error::Config(
                "connect_timeout_ms and publish_timeout_ms must be positive".to_string(),
            ));
        }
        if self.buffer.path.as_os_str().is_empty() {
            return Err(Error::Config("buffer path cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
