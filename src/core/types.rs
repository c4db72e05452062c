//! core::types
//!
//! Dependency model consumed by the pin resolver.
//!
//! # Types
//!
//! - [`Dependency`] - A dependency as reported by an ecosystem file parser
//! - [`DependencyRequirement`] - One manifest requirement, with its source
//! - [`SourceDetails`] - Where a requirement is fetched from (git, registry)
//!
//! # Example
//!
//! ```
//! use gitpin::core::types::{Dependency, DependencyRequirement, SourceDetails};
//!
//! let dep = Dependency::new("business", Some("1.0.0"), "bundler").with_requirement(
//!     DependencyRequirement::from_source(SourceDetails::git(
//!         "https://github.com/gocardless/business",
//!         Some("v1.0.0"),
//!         Some("master"),
//!     )),
//! );
//!
//! let source = dep.git_source().unwrap().unwrap();
//! assert_eq!(source.reference.as_deref(), Some("v1.0.0"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from interpreting a dependency's sources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The requirements point at more than one git repository.
    #[error("multiple git sources for dependency: {0}")]
    MultipleSources(String),
}

/// Kind of requirement source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Git,
    Registry,
    #[serde(other)]
    Other,
}

/// Declared source of a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDetails {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Repository or registry URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Declared ref (tag, SHA, or branch name).
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    /// Declared branch being tracked.
    #[serde(default)]
    pub branch: Option<String>,
}

impl SourceDetails {
    /// A git source.
    pub fn git(url: &str, reference: Option<&str>, branch: Option<&str>) -> Self {
        Self {
            kind: SourceKind::Git,
            url: Some(url.to_string()),
            reference: reference.map(str::to_string),
            branch: branch.map(str::to_string),
        }
    }

    /// A registry source.
    pub fn registry(url: &str) -> Self {
        Self {
            kind: SourceKind::Registry,
            url: Some(url.to_string()),
            reference: None,
            branch: None,
        }
    }

    /// The declared ref, falling back to the declared branch.
    pub fn ref_or_branch(&self) -> Option<&str> {
        self.reference.as_deref().or(self.branch.as_deref())
    }
}

/// One requirement of a dependency, as found in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRequirement {
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub source: Option<SourceDetails>,
}

impl DependencyRequirement {
    /// A requirement carrying only a source.
    pub fn from_source(source: SourceDetails) -> Self {
        Self {
            requirement: None,
            file: String::new(),
            source: Some(source),
        }
    }
}

/// A dependency under check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Currently resolved version, if known.
    #[serde(default)]
    pub version: Option<String>,
    /// Ecosystem identifier, e.g. `bundler` or `cargo`.
    pub package_manager: String,
    #[serde(default)]
    pub requirements: Vec<DependencyRequirement>,
}

impl Dependency {
    pub fn new(name: &str, version: Option<&str>, package_manager: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.map(str::to_string),
            package_manager: package_manager.to_string(),
            requirements: Vec::new(),
        }
    }

    pub fn with_requirement(mut self, requirement: DependencyRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Copy of this dependency with every requirement removed.
    ///
    /// Registry lookups use this so they resolve the published package rather
    /// than the git source the manifest points at.
    pub fn without_sources(&self) -> Self {
        Self {
            requirements: Vec::new(),
            ..self.clone()
        }
    }

    /// The single git source of this dependency.
    ///
    /// Returns `Ok(None)` for non-git dependencies. When several git sources
    /// share one URL the first wins (they only differ by ref, and updating all
    /// of them together is fine). Different URLs are an error.
    pub fn git_source(&self) -> Result<Option<&SourceDetails>, SourceError> {
        let mut sources: Vec<&SourceDetails> = Vec::new();
        for source in self.requirements.iter().filter_map(|r| r.source.as_ref()) {
            if source.kind == SourceKind::Git && !sources.contains(&source) {
                sources.push(source);
            }
        }

        let Some(first) = sources.first().copied() else {
            return Ok(None);
        };
        if sources.iter().any(|s| s.url != first.url) {
            let urls: Vec<String> = sources
                .iter()
                .map(|s| s.url.clone().unwrap_or_default())
                .collect();
            return Err(SourceError::MultipleSources(urls.join(", ")));
        }
        Ok(Some(first))
    }
}
