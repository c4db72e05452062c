//! metadata
//!
//! Lookup of a dependency's listing source: the repository its package
//! registry advertises.
//!
//! # Design
//!
//! Registry lookups are ecosystem specific and live outside this crate. The
//! pin resolver only needs the answer, so it depends on the
//! [`SourceUrlFinder`] trait. Callers hand it a copy of the dependency with
//! every requirement removed, so the lookup goes to the registry instead of
//! echoing the git source back.
//!
//! [`StaticSourceFinder`] answers with a fixed URL. The CLI uses it for
//! `--listing-url`, and tests use it to script the lookup.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::Dependency;

/// Errors from registry lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("registry lookup failed for '{dependency}': {message}")]
    LookupFailed { dependency: String, message: String },
}

/// Finds the listing source URL of a dependency.
#[async_trait]
pub trait SourceUrlFinder: Send + Sync {
    /// Repository URL the registry lists for `dependency`, if any.
    async fn source_url(&self, dependency: &Dependency) -> Result<Option<String>, MetadataError>;
}

/// [`SourceUrlFinder`] with a fixed answer.
#[derive(Debug)]
pub struct StaticSourceFinder {
    answer: Result<Option<String>, MetadataError>,
    calls: AtomicUsize,
}

impl StaticSourceFinder {
    /// Always answer `url`.
    pub fn new(url: Option<&str>) -> Self {
        Self {
            answer: Ok(url.map(str::to_string)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: MetadataError) -> Self {
        Self {
            answer: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of lookups made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceUrlFinder for StaticSourceFinder {
    async fn source_url(&self, dependency: &Dependency) -> Result<Option<String>, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(dependency = %dependency.name, "static listing source lookup");
        self.answer.clone()
    }
}

impl Default for StaticSourceFinder {
    fn default() -> Self {
        Self::new(None)
    }
}
