//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds library types from its arguments and the loaded configuration
//! 2. Runs the network queries
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Every command talks to the network, so `dispatch` owns a tokio runtime
//! and blocks on the handler.

mod check;
mod head;
mod refs;

pub use check::{check, CheckReport};
pub use head::head;
pub use refs::refs;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::args::Command;
use crate::core::config::Config;
use crate::git::{GitReferenceFetcher, ReqwestTransport, SystemCommandRunner};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    match command {
        Command::Refs { url, tags, json } => rt.block_on(refs(config, &url, tags, json)),
        Command::Head { url, reference } => rt.block_on(head(config, &url, reference.as_deref())),
        Command::Check(args) => rt.block_on(check(config, &args)),
    }
}

/// A fetcher for `url` using the configured transports and credentials.
fn fetcher_for(config: &Config, url: &str) -> Result<GitReferenceFetcher> {
    let settings = &config.file.transport;
    let http = ReqwestTransport::new(settings).context("failed to build HTTP client")?;
    let runner = SystemCommandRunner::new(settings.ls_remote_timeout());
    Ok(GitReferenceFetcher::new(
        url,
        config.file.credentials.clone(),
        Arc::new(http),
        Arc::new(runner),
    ))
}
