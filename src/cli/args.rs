//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitpin - Inspect git refs and resolve dependency pins without cloning
#[derive(Parser, Debug)]
#[command(name = "gitpin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $GITPIN_CONFIG, then the XDG location)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the refs a repository advertises
    #[command(
        name = "refs",
        long_about = "List the branches and tags a repository advertises.\n\n\
            Refs are read from the smart-HTTP advertisement, falling back to \
            `git ls-remote` when the HTTP request fails. Annotated tags are \
            shown with the commit they point to.",
        after_help = "\
EXAMPLES:
    gitpin refs https://github.com/gocardless/business
    gitpin refs git@github.com:gocardless/business --tags
    gitpin refs https://gitlab.com/group/project --json"
    )]
    Refs {
        /// Repository URL (HTTPS or SCP-style)
        url: String,

        /// Only show tags
        #[arg(long)]
        tags: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the commit a ref points to
    #[command(
        name = "head",
        after_help = "\
EXAMPLES:
    gitpin head https://github.com/gocardless/business
    gitpin head https://github.com/gocardless/business v1.2.0"
    )]
    Head {
        /// Repository URL
        url: String,

        /// Branch or tag name (defaults to HEAD)
        #[arg(value_name = "REF")]
        reference: Option<String>,
    },

    /// Resolve pin state and upgrade candidates for a git dependency
    #[command(
        name = "check",
        long_about = "Resolve the pin state of a git dependency and the tag it \
            could move to.\n\n\
            The dependency is described by its repository, the ref and branch \
            its manifest declares, and its current version. Ignore requirements \
            from the command line are added to those in the configuration file.",
        after_help = "\
EXAMPLES:
    # Pinned to a tag
    gitpin check --url https://github.com/gocardless/business --ref v1.0.0 --version 1.0.0

    # Tracking a branch, checked against a published release
    gitpin check --url https://github.com/fork/business --branch master \\
        --listing-url https://github.com/gocardless/business --release 1.5.0

    # Skip a major version
    gitpin check --url https://github.com/gocardless/business --ref v1.0.0 --ignore '>= 2.0'"
    )]
    Check(CheckArgs),
}

/// Arguments of `gitpin check`.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Repository URL of the git source
    #[arg(long)]
    pub url: String,

    /// Declared ref (tag, SHA or branch name)
    #[arg(long = "ref", value_name = "REF")]
    pub reference: Option<String>,

    /// Declared branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Currently resolved version
    #[arg(long)]
    pub version: Option<String>,

    /// Dependency name
    #[arg(long, default_value = "dependency")]
    pub name: String,

    /// Package manager, selects the version scheme
    #[arg(long, default_value = "bundler")]
    pub package_manager: String,

    /// Ignore versions matching this requirement (repeatable)
    #[arg(long = "ignore", value_name = "REQUIREMENT")]
    pub ignore: Vec<String>,

    /// Fail when every newer version is ignored
    #[arg(long)]
    pub raise_on_ignored: bool,

    /// Treat version-shaped branch names as pinned
    #[arg(long)]
    pub consider_version_branches_pinned: bool,

    /// Repository the package registry lists for this dependency
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Check whether the pin is included in this released version
    #[arg(long)]
    pub release: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
