// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

const QUICKSTART_HELP: &str = "\
Get started:
  sfbridge run --endpoint ws://broker:8080/ingest   Forward packets from 127.0.0.1:1700
  sfbridge run --config bridge.toml                 Use a config file
  sfbridge status                                   Show how many packets are buffered";

#[derive(Parser)]
#[command(name = "sfbridge")]
#[command(about = "Store-and-forward bridge for sensor packets")]
#[command(
    long_about = "Store-and-forward bridge for sensor packets.\n\n\
    Forwards local UDP packets to a remote WebSocket endpoint and keeps them in a \
    durable file buffer while the remote link is down."
)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the bridge until interrupted
    Run(RunArgs),

    /// Show the number of packets waiting in the buffer
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// TOML config file
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remote WebSocket endpoint (ws://host:port/path)
    #[arg(long, short, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Topic announced to the remote
    #[arg(long, short)]
    pub topic: Option<String>,

    /// Client id announced to the remote
    #[arg(long = "client-id", value_name = "ID")]
    pub client_id: Option<String>,

    /// UDP address to receive local packets on
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Buffer file
    #[arg(long, value_name = "PATH")]
    pub buffer: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            client_id: self.client_id.clone(),
            topic: self.topic.clone(),
            bind: self.bind,
            buffer: self.buffer.clone(),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {
    /// TOML config file
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Buffer file
    #[arg(long, value_name = "PATH")]
    pub buffer: Option<PathBuf>,
}

impl StatusArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            buffer: self.buffer.clone(),
            ..Overrides::default()
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
