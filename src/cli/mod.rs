//! cli
//!
//! Command-line interface layer for gitpin.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and install logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers build the library types
//! ([`GitReferenceFetcher`](crate::git::GitReferenceFetcher),
//! [`PinResolver`](crate::checker::PinResolver)) from arguments and
//! configuration, run them on a tokio runtime, and format the answers.

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Command};

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = config.path() {
        tracing::debug!(path = %path.display(), "using config file");
    }

    commands::dispatch(cli.command, &config)
}

/// Logs go to stderr; `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "gitpin=debug" } else { "gitpin=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
