// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sfbridge - store-and-forward bridge between a local packet source and a
//! remote endpoint.
//!
//! The forwarding logic lives in `sf-core`; this crate supplies the process
//! around it:
//!
//! - [`local`] - UDP source for sensor packets
//! - [`remote`] - WebSocket sink and the reconnecting connection manager
//! - [`config`] - TOML config with command-line overrides
//! - [`runner`] - task wiring, startup and shutdown

mod cli;
mod logging;

pub mod config;
pub mod error;
pub mod local;
pub mod lock;
pub mod remote;
pub mod runner;

pub use cli::{Cli, Command, RunArgs, StatusArgs};
pub use config::{Config, Overrides};
pub use error::{Error, Result};
pub use runner::{run_bridge, Bridge};

/// Execute a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => {
            logging::setup_logging(args.verbose);
            let config = Config::resolve(args.config.as_deref(), args.overrides())?;
            config.validate()?;
            run_bridge(&config)
        }
        Command::Status(args) => {
            let config = Config::resolve(args.config.as_deref(), args.overrides())?;
            status(&config)
        }
    }
}

/// Print the number of buffered packets without opening the buffer for writing.
fn status(config: &Config) -> Result<()> {
    let path = &config.buffer.path;
    let count = sf_core::count_records(path)?;
    println!("{} packets buffered in {}", count, path.display());
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
