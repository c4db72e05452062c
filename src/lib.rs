//! gitpin - Git ref discovery and pin resolution for dependency updates
//!
//! gitpin answers three questions about a dependency whose source is a git
//! repository, without cloning it: is the dependency pinned, what is the best
//! tag to move it to, and is the pinned commit already part of a published
//! release?
//!
//! # Architecture
//!
//! - [`git`] - Smart-HTTP / `ls-remote` ref advertisement fetching and parsing
//! - [`checker`] - Pin resolution: pin state, tag selection, release inclusion
//! - [`version`] - Pluggable version and requirement schemes
//! - [`forge`] - Compare-commits clients for GitHub, GitLab and Bitbucket
//! - [`metadata`] - Registry lookup for the canonical listing repository
//! - [`core`] - Dependency model, credentials and configuration
//! - [`cli`] - Command-line interface
//!
//! # Invariants
//!
//! 1. A ref advertisement is fetched at most once per fetcher instance
//! 2. Parsed refs always carry the peeled commit SHA
//! 3. Failures while looking up the listing repository never fail a check
//! 4. No mutable state is shared between two dependency checks

pub mod checker;
pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
pub mod metadata;
pub mod version;
