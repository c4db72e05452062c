//! checker::tag_pattern
//!
//! Recognizing version-shaped ref names.
//!
//! # Version Shape
//!
//! A ref name is version-shaped when it ends in either
//!
//! - a single integer right after a leading `v` (`v2`, `v2-beta`), or
//! - at least two dot-separated groups, the first two numeric
//!   (`1.2`, `release-1.2.3`, `v1.0.0-rc1`).
//!
//! Matching is case-insensitive. The matched tail is the version; everything
//! before it, minus one trailing `v`, is the prefix. Two names share a prefix
//! when those leftovers are equal, so `v1.2` and `v2.0` match while
//! `release-1.0` and `v1.0` do not.

use std::sync::LazyLock;

use regex::Regex;

/// `v<int>` with an optional hyphenated suffix, spanning the whole name.
static LEADING_V_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^v([0-9]+(?:-[a-z0-9]+)?)$").expect("valid leading-v version regex")
});

/// Dotted version at the end of the name.
static DOTTED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9]+\.[0-9]+(?:\.[a-z0-9-]+)*$").expect("valid dotted version regex")
});

static COMMIT_SHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{6,40}$").expect("valid commit sha regex"));

/// Byte offset and text of the version inside `name`.
fn find_version(name: &str) -> Option<(usize, &str)> {
    if let Some(caps) = LEADING_V_VERSION.captures(name) {
        let m = caps.get(1)?;
        return Some((m.start(), m.as_str()));
    }
    DOTTED_VERSION.find(name).map(|m| (m.start(), m.as_str()))
}

/// The version part of a ref name, e.g. `1.2.3` for `release-v1.2.3`.
pub fn scan_version(name: &str) -> Option<&str> {
    find_version(name).map(|(_, version)| version)
}

pub fn is_version_tag(name: &str) -> bool {
    find_version(name).is_some()
}

/// What is left of `name` once the version and one trailing `v` are removed.
pub fn version_prefix(name: &str) -> &str {
    let prefix = match find_version(name) {
        Some((start, _)) => &name[..start],
        None => name,
    };
    prefix
        .strip_suffix(['v', 'V'])
        .unwrap_or(prefix)
}

pub fn same_prefix(a: &str, b: &str) -> bool {
    version_prefix(a) == version_prefix(b)
}

/// Number of dot-separated components.
pub fn precision(version: &str) -> usize {
    version.split('.').count()
}

/// Whether `ref_name` is 6 to 40 lowercase hex characters.
pub fn looks_like_commit_sha(ref_name: &str) -> bool {
    COMMIT_SHA.is_match(ref_name)
}

/// Whether a listing tag name is the release of `version`.
///
/// The name must end with `version`, and the character before it (if any)
/// must be neither a digit nor a dot, so `v1.2.0` and `release-1.2.0` match
/// `1.2.0` but `11.2.0` and `0.1.2.0` do not.
pub fn listing_tag_matches(tag_name: &str, version: &str) -> bool {
    match tag_name.strip_suffix(version) {
        Some(head) => !head.ends_with(|c: char| c.is_ascii_digit() || c == '.'),
        None => false,
    }
}
