//! version
//!
//! Pluggable version and requirement schemes.
//!
//! # Design
//!
//! Version semantics differ per ecosystem, so the pin resolver never parses
//! versions itself. It is handed a [`VersionScheme`] at construction and asks
//! it to parse tag versions, parse ignore requirements, and test one against
//! the other.
//!
//! Two schemes ship with the crate:
//!
//! - [`GenericScheme`] - Dotted versions with alphanumeric prerelease parts,
//!   compared segment by segment (the rubygems model)
//! - [`SemverScheme`] - Strict semver via the `semver` crate, with short
//!   versions padded to three components
//!
//! # Requirements
//!
//! A requirement string is a list of alternatives separated by `||`; each
//! alternative is a comma-separated conjunction of comparators. A version
//! satisfies the string if it satisfies any alternative.
//!
//! # Example
//!
//! ```
//! use gitpin::version::{GenericScheme, VersionScheme};
//!
//! let scheme = GenericScheme;
//! let reqs = scheme.parse_requirements(">= 1.0, < 2.0 || = 3.0").unwrap();
//! let v = scheme.parse_version("1.4.2").unwrap();
//! assert!(scheme.any_satisfied(&reqs, &v));
//! ```

pub mod generic;
pub mod semver;

pub use self::generic::{GenericRequirement, GenericScheme, GenericVersion};
pub use self::semver::SemverScheme;

use std::fmt::{Debug, Display};

use thiserror::Error;

/// Errors from version parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version: '{0}'")]
    InvalidVersion(String),

    #[error("invalid requirement: '{0}'")]
    InvalidRequirement(String),
}

/// A parsed version with a total order.
pub trait SchemeVersion: Ord + Display + Clone + Debug + Send + Sync {
    fn is_prerelease(&self) -> bool;
}

/// Version semantics for one ecosystem.
pub trait VersionScheme: Send + Sync {
    type Version: SchemeVersion;
    type Requirement: Debug + Send + Sync;

    /// Parse a version string.
    fn parse_version(&self, input: &str) -> Result<Self::Version, VersionError>;

    /// Parse one alternative (a comma-separated conjunction).
    fn parse_requirement(&self, input: &str) -> Result<Self::Requirement, VersionError>;

    fn satisfied_by(&self, requirement: &Self::Requirement, version: &Self::Version) -> bool;

    /// Parse a requirement string into its `||` alternatives.
    fn parse_requirements(&self, input: &str) -> Result<Vec<Self::Requirement>, VersionError> {
        input
            .split("||")
            .map(|alternative| self.parse_requirement(alternative.trim()))
            .collect()
    }

    /// Whether `input` parses as a version.
    fn is_valid_version(&self, input: &str) -> bool {
        self.parse_version(input).is_ok()
    }

    /// Whether any requirement in `requirements` accepts `version`.
    fn any_satisfied(&self, requirements: &[Self::Requirement], version: &Self::Version) -> bool {
        requirements.iter().any(|r| self.satisfied_by(r, version))
    }
}

/// Which built-in scheme an ecosystem uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Generic,
    Semver,
}

/// Built-in scheme for a package manager name.
pub fn scheme_for_package_manager(package_manager: &str) -> SchemeKind {
    match package_manager {
        "cargo" | "npm_and_yarn" | "composer" | "elm" => SchemeKind::Semver,
        _ => SchemeKind::Generic,
    }
}
