// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

fn valid() -> Config {
    Config::default().with_overrides(Overrides {
        endpoint: Some("ws://localhost:8080/ingest".to_string()),
        ..Overrides::default()
    })
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.local.bind, "127.0.0.1:1700".parse().unwrap());
    assert_eq!(config.remote.client_id, "basicPubSub");
    assert_eq!(config.remote.topic, "sdk/test/Python");
    assert_eq!(config.remote.initial_delay(), Duration::from_secs(1));
    assert_eq!(config.remote.max_delay(), Duration::from_secs(32));
    assert_eq!(config.remote.stable_after(), Duration::from_secs(20));
    assert_eq!(config.remote.connect_timeout(), Duration::from_secs(10));
    assert_eq!(config.remote.publish_timeout(), Duration::from_secs(5));
    assert_eq!(config.buffer.path, PathBuf::from("packet-storage.jsonl"));
}

#[test]
fn load_partial_file_fills_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bridge.toml");
    fs::write(
        &path,
        r#"
[remote]
url = "ws://broker:9000/"
topic = "lora/up"
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.remote.url, "ws://broker:9000/");
    assert_eq!(config.remote.topic, "lora/up");
    assert_eq!(config.remote.client_id, "basicPubSub");
    assert_eq!(config.local, LocalConfig::default());
    assert_eq!(config.buffer, BufferConfig::default());
}

#[test]
fn save_format_roundtrips() {
    let config = valid();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn load_missing_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(&temp.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn load_invalid_toml_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    fs::write(&path, "[remote\nurl = 1").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn overrides_take_precedence() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bridge.toml");
    fs::write(
        &path,
        "[remote]\nurl = \"ws://file/\"\nclient_id = \"file-id\"\n",
    )
    .unwrap();

    let config = Config::resolve(
        Some(&path),
        Overrides {
            endpoint: Some("ws://flag/".to_string()),
            bind: Some("0.0.0.0:9999".parse().unwrap()),
            buffer: Some(PathBuf::from("/var/lib/sf/buffer.jsonl")),
            ..Overrides::default()
        },
    )
    .unwrap();

    assert_eq!(config.remote.url, "ws://flag/");
    assert_eq!(config.remote.client_id, "file-id");
    assert_eq!(config.local.bind, "0.0.0.0:9999".parse().unwrap());
    assert_eq!(config.buffer.path, PathBuf::from("/var/lib/sf/buffer.jsonl"));
}

#[test]
fn valid_config_passes() {
    valid().validate().unwrap();
}

#[parameterized(
    missing_url = { "", "remote url is required" },
    tls_url = { "wss://broker/", "TLS" },
    http_url = { "http://broker/", "must start with ws://" },
)]
fn url_validation(url: &str, expected: &str) {
    let mut config = valid();
    config.remote.url = url.to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains(expected), "{err}");
}

#[test]
fn empty_topic_rejected() {
    let mut config = valid();
    config.remote.topic = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn empty_client_id_rejected() {
    let mut config = valid();
    config.remote.client_id = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn initial_delay_above_cap_rejected() {
    let mut config = valid();
    config.remote.reconnect_initial_delay_ms = 60_000;
    config.remote.reconnect_max_delay_secs = 30;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn zero_initial_delay_rejected() {
    let mut config = valid();
    config.remote.reconnect_initial_delay_ms = 0;
    assert!(config.validate().is_err());
}

#[parameterized(
    connect = { 0, 5_000 },
    publish = { 10_000, 0 },
)]
fn zero_timeouts_rejected(connect_ms: u64, publish_ms: u64) {
    let mut config = valid();
    config.remote.connect_timeout_ms = connect_ms;
    config.remote.publish_timeout_ms = publish_ms;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("must be positive"), "{err}");
}
