//! checker
//!
//! Pin resolution for git dependencies.
//!
//! # Architecture
//!
//! A [`PinResolver`] is built for one dependency check and thrown away
//! afterwards. It owns a [`GitReferenceFetcher`](crate::git::GitReferenceFetcher)
//! for the dependency's repository and, lazily, a second one for the
//! listing source the registry advertises. Everything it learns over the
//! network is memoized for the lifetime of the resolver only.
//!
//! - [`tag_pattern`] - Version-shaped names, prefixes and precision
//! - `resolver` - Pin state, tag selection and SHA pins
//! - `release` - Listing source lookups and release inclusion
//!
//! Shared collaborators (transports, registry finder, forge factory) come in
//! through a [`CheckerContext`]; none of them hold per-dependency state.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitpin::checker::{CheckerContext, PinResolver};
//! use gitpin::core::config::FileConfig;
//! use gitpin::core::types::{Dependency, DependencyRequirement, SourceDetails};
//! use gitpin::metadata::StaticSourceFinder;
//! use gitpin::version::GenericScheme;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FileConfig::default();
//! let context = CheckerContext::from_config(&config, Arc::new(StaticSourceFinder::default()))?;
//!
//! let dependency = Dependency::new("business", Some("1.0.0"), "bundler").with_requirement(
//!     DependencyRequirement::from_source(SourceDetails::git(
//!         "https://github.com/gocardless/business",
//!         Some("v1.0.0"),
//!         None,
//!     )),
//! );
//!
//! let resolver = PinResolver::new(dependency, GenericScheme, &config.checker, context)?;
//! if resolver.pinned().await? {
//!     if let Some(tag) = resolver.local_tag_for_latest_version().await? {
//!         println!("latest: {} ({})", tag.tag, tag.commit_sha);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod release;
mod resolver;
pub mod tag_pattern;

pub use resolver::PinResolver;

use std::sync::Arc;

use thiserror::Error;

use crate::core::config::FileConfig;
use crate::core::credentials::Credentials;
use crate::core::types::SourceError;
use crate::forge::{DefaultForgeFactory, ForgeError, ForgeFactory};
use crate::git::{
    CommandRunner, FetchError, GitReferenceFetcher, HttpTransport, ReqwestTransport,
    SystemCommandRunner, TransportError,
};
use crate::metadata::SourceUrlFinder;
use crate::version::VersionError;

/// Errors from pin resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckerError {
    /// A git-only query was made for a dependency without a git source.
    #[error("dependency '{0}' is not a git dependency")]
    NotGitDependency(String),

    /// The requirements point at more than one repository.
    #[error(transparent)]
    MultipleSources(#[from] SourceError),

    /// The dependency's own repository could not be fetched.
    #[error(transparent)]
    Unreachable(#[from] FetchError),

    /// The declared branch or ref is not advertised.
    #[error("git reference not found for dependency '{dependency}'")]
    ReferenceNotFound { dependency: String },

    /// Every upgrade candidate was removed by an ignore requirement.
    #[error("all versions of '{dependency}' newer than the current one are ignored")]
    AllVersionsIgnored { dependency: String },

    /// An ignore requirement could not be parsed.
    #[error("invalid ignore requirement: {0}")]
    InvalidRequirement(#[from] VersionError),

    /// The compare API could not be asked (auth, rate limit, network).
    #[error("forge error: {0}")]
    Forge(#[from] ForgeError),
}

/// Collaborators shared by every resolver.
#[derive(Clone)]
pub struct CheckerContext {
    pub http: Arc<dyn HttpTransport>,
    pub runner: Arc<dyn CommandRunner>,
    pub finder: Arc<dyn SourceUrlFinder>,
    pub forges: Arc<dyn ForgeFactory>,
    pub credentials: Credentials,
}

impl std::fmt::Debug for CheckerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerContext")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl CheckerContext {
    pub fn new(
        http: Arc<dyn HttpTransport>,
        runner: Arc<dyn CommandRunner>,
        finder: Arc<dyn SourceUrlFinder>,
        forges: Arc<dyn ForgeFactory>,
        credentials: Credentials,
    ) -> Self {
        Self {
            http,
            runner,
            finder,
            forges,
            credentials,
        }
    }

    /// Real transports and forge clients built from configuration.
    pub fn from_config(
        config: &FileConfig,
        finder: Arc<dyn SourceUrlFinder>,
    ) -> Result<Self, TransportError> {
        let http = ReqwestTransport::new(&config.transport)?;
        let runner = SystemCommandRunner::new(config.transport.ls_remote_timeout());
        let forges = DefaultForgeFactory::new(config.credentials.clone(), config.forges.clone());

        Ok(Self::new(
            Arc::new(http),
            Arc::new(runner),
            finder,
            Arc::new(forges),
            config.credentials.clone(),
        ))
    }

    /// A fetcher for `url` that shares this context's transports.
    pub fn fetcher(&self, url: &str) -> GitReferenceFetcher {
        GitReferenceFetcher::new(
            url,
            self.credentials.clone(),
            Arc::clone(&self.http),
            Arc::clone(&self.runner),
        )
    }
}
