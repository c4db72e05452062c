//! core
//!
//! Dependency model, credentials and configuration for gitpin.
//!
//! # Modules
//!
//! - [`types`] - Dependency, requirement and source types
//! - [`credentials`] - Read-only credential set
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod credentials;
pub mod types;
