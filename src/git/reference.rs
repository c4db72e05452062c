//! git::reference
//!
//! Resolved references parsed from a ref advertisement.
//!
//! # Types
//!
//! - [`GitRef`] - One advertised branch or tag, with its peeled commit
//! - [`RefType`] - Whether the ref lives under `refs/tags/` or `refs/heads/`
//! - [`LocalTag`] - A selected tag together with its parsed version
//!
//! # Invariants
//!
//! `commit_sha` is always a commit: for annotated tags the parser replaces the
//! tag object SHA with the SHA from the `^{}` peel line before a `GitRef` is
//! handed out.

use std::fmt;

use serde::Serialize;

/// Prefix a dependency uses to disambiguate a tag from a branch of the same name.
pub const TAGS_PREFIX: &str = "tags/";

/// Kind of advertised ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    /// `refs/tags/*`
    Tag,
    /// `refs/heads/*`
    Head,
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefType::Tag => write!(f, "tag"),
            RefType::Head => write!(f, "head"),
        }
    }
}

/// A single resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRef {
    name: String,
    ref_type: RefType,
    ref_sha: String,
    commit_sha: String,
}

impl GitRef {
    /// Create a ref whose object is the commit itself (branch or lightweight tag).
    pub fn new(name: impl Into<String>, ref_type: RefType, sha: impl Into<String>) -> Self {
        let sha = sha.into();
        Self {
            name: name.into(),
            ref_type,
            commit_sha: sha.clone(),
            ref_sha: sha,
        }
    }

    /// Create a ref whose object differs from the commit it points at.
    pub fn peeled(
        name: impl Into<String>,
        ref_type: RefType,
        ref_sha: impl Into<String>,
        commit_sha: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ref_type,
            ref_sha: ref_sha.into(),
            commit_sha: commit_sha.into(),
        }
    }

    /// Short name, without `refs/heads/` or `refs/tags/`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ref_type(&self) -> RefType {
        self.ref_type
    }

    /// SHA of the advertised object (tag object for annotated tags).
    pub fn ref_sha(&self) -> &str {
        &self.ref_sha
    }

    /// SHA of the commit the ref ultimately points at.
    pub fn commit_sha(&self) -> &str {
        &self.commit_sha
    }

    /// SHA of the annotated tag object, if this is an annotated tag.
    pub fn tag_sha(&self) -> Option<&str> {
        match self.ref_type {
            RefType::Tag if self.ref_sha != self.commit_sha => Some(&self.ref_sha),
            _ => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        self.ref_type == RefType::Tag
    }

    /// Return a copy of this ref with `prefix` prepended to its name.
    pub fn with_name_prefix(&self, prefix: &str) -> Self {
        Self {
            name: format!("{}{}", prefix, self.name),
            ..self.clone()
        }
    }
}

/// Re-prefix every ref name with `tags/` when the declared ref asks for it.
///
/// A dependency declared as `ref: tags/v1.2.0` must see tag names in that same
/// form, otherwise none of the name comparisons downstream line up.
pub fn apply_tag_prefix(refs: &[GitRef], declared_ref: Option<&str>) -> Vec<GitRef> {
    match declared_ref {
        Some(r) if r.starts_with(TAGS_PREFIX) => refs
            .iter()
            .map(|r| r.with_name_prefix(TAGS_PREFIX))
            .collect(),
        _ => refs.to_vec(),
    }
}

/// A tag picked as an upgrade candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalTag<V> {
    /// Tag name as seen by the dependency (may carry a `tags/` prefix).
    pub tag: String,
    /// Version parsed from the tag name.
    pub version: V,
    /// Commit the tag points at.
    pub commit_sha: String,
    /// Advertised object SHA of the tag.
    pub tag_sha: String,
}
