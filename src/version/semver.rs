//! version::semver
//!
//! Semver scheme backed by the `semver` crate.
//!
//! Tags often carry one- or two-component versions (`v2`, `1.4`), which
//! strict semver rejects. Those are padded with zeros before parsing, so
//! `1.4` reads as `1.4.0` and `1.4-beta` as `1.4.0-beta`.

use ::semver::{Version, VersionReq};

use super::{SchemeVersion, VersionError, VersionScheme};

/// Scheme for ecosystems that follow semver (cargo, npm).
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverScheme;

impl SchemeVersion for Version {
    fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

/// Pad `major` / `major.minor` to three components, keeping any suffix.
fn pad(input: &str) -> String {
    let split_at = input.find(['-', '+']).unwrap_or(input.len());
    let (core, suffix) = input.split_at(split_at);
    let missing = 3usize.saturating_sub(core.split('.').count());
    let mut padded = core.to_string();
    for _ in 0..missing {
        padded.push_str(".0");
    }
    padded.push_str(suffix);
    padded
}

impl VersionScheme for SemverScheme {
    type Version = Version;
    type Requirement = VersionReq;

    fn parse_version(&self, input: &str) -> Result<Version, VersionError> {
        Version::parse(&pad(input.trim()))
            .map_err(|_| VersionError::InvalidVersion(input.to_string()))
    }

    fn parse_requirement(&self, input: &str) -> Result<VersionReq, VersionError> {
        VersionReq::parse(input).map_err(|_| VersionError::InvalidRequirement(input.to_string()))
    }

    fn satisfied_by(&self, requirement: &VersionReq, version: &Version) -> bool {
        requirement.matches(version)
    }
}
