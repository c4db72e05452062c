//! checker::resolver
//!
//! Pin state and upgrade-candidate selection for one git dependency.
//!
//! # Pin State
//!
//! `pinned` walks these rules in order; the first that applies wins:
//!
//! 1. No declared ref: not pinned
//! 2. Branch equal to the ref: not pinned
//! 3. Any other branch declared: pinned
//! 4. Dependency version starts with the ref: pinned
//! 5. Ref advertised as `refs/tags/<ref>`: pinned
//! 6. Ref not advertised as `refs/heads/<ref>`: pinned (SHA, unknown name)
//! 7. Otherwise the ref is a live branch, pinned only when
//!    `consider_version_branches_pinned` is set and the name is
//!    version-shaped
//!
//! # Candidate Selection
//!
//! Candidates are the repository's tags (or all refs), narrowed to
//! version-shaped names sharing the declared ref's prefix, minus ignored
//! versions, minus prereleases unless the pin is itself a prerelease. The
//! maximum under the injected [`VersionScheme`] wins; the precision variants
//! first keep only names with as many (or at most as many) dot-separated
//! components as the current version.

use tokio::sync::OnceCell;

use super::tag_pattern::{
    is_version_tag, looks_like_commit_sha, precision, same_prefix, scan_version,
};
use super::{CheckerContext, CheckerError};
use crate::core::config::CheckerSettings;
use crate::core::types::{Dependency, SourceDetails};
use crate::git::{apply_tag_prefix, FetchError, GitRef, GitReferenceFetcher, LocalTag, TAGS_PREFIX};
use crate::version::{SchemeVersion, VersionScheme};

/// Resolves pin state and upgrade candidates for one dependency.
///
/// Construct one per dependency check. Network answers (the advertisement,
/// the listing source and its tags, the tag behind a SHA pin) are memoized on
/// the instance, so repeated queries cost nothing.
pub struct PinResolver<S: VersionScheme> {
    pub(super) dependency: Dependency,
    pub(super) source: Option<SourceDetails>,
    pub(super) scheme: S,
    ignored: Vec<S::Requirement>,
    raise_on_ignored: bool,
    consider_version_branches_pinned: bool,
    pub(super) context: CheckerContext,
    local: Option<GitReferenceFetcher>,
    pinned: OnceCell<bool>,
    pinned_sha_tag: OnceCell<Option<String>>,
    pub(super) listing_source_url: OnceCell<Option<String>>,
    pub(super) listing_tags: OnceCell<Vec<GitRef>>,
}

impl<S: VersionScheme> std::fmt::Debug for PinResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinResolver")
            .field("dependency", &self.dependency.name)
            .field("source", &self.source)
            .field("ignored", &self.ignored)
            .field("raise_on_ignored", &self.raise_on_ignored)
            .field(
                "consider_version_branches_pinned",
                &self.consider_version_branches_pinned,
            )
            .finish_non_exhaustive()
    }
}

impl<S: VersionScheme> PinResolver<S> {
    /// Create a resolver for `dependency`.
    ///
    /// A git source without a URL is treated as no git source at all.
    ///
    /// # Errors
    ///
    /// - `MultipleSources` if the requirements name different repositories
    /// - `InvalidRequirement` if an ignore requirement does not parse
    pub fn new(
        dependency: Dependency,
        scheme: S,
        settings: &CheckerSettings,
        context: CheckerContext,
    ) -> Result<Self, CheckerError> {
        let source = dependency
            .git_source()?
            .filter(|s| s.url.is_some())
            .cloned();

        let mut ignored = Vec::new();
        for requirement in &settings.ignored_versions {
            ignored.extend(scheme.parse_requirements(requirement)?);
        }

        let local = source
            .as_ref()
            .and_then(|s| s.url.as_deref())
            .map(|url| context.fetcher(url));

        Ok(Self {
            dependency,
            source,
            scheme,
            ignored,
            raise_on_ignored: settings.raise_on_ignored,
            consider_version_branches_pinned: settings.consider_version_branches_pinned,
            context,
            local,
            pinned: OnceCell::new(),
            pinned_sha_tag: OnceCell::new(),
            listing_source_url: OnceCell::new(),
            listing_tags: OnceCell::new(),
        })
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn is_git_dependency(&self) -> bool {
        self.local.is_some()
    }

    /// Fetcher for the dependency's own repository.
    pub(super) fn local(&self) -> Result<&GitReferenceFetcher, CheckerError> {
        self.local
            .as_ref()
            .ok_or_else(|| CheckerError::NotGitDependency(self.dependency.name.clone()))
    }

    pub(super) fn declared_ref(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.reference.as_deref())
    }

    pub(super) fn ref_or_branch(&self) -> Option<&str> {
        self.source.as_ref().and_then(SourceDetails::ref_or_branch)
    }

    // --- pin state ---

    /// Whether the declared source locks to a fixed tag or commit.
    ///
    /// # Errors
    ///
    /// `NotGitDependency`, or `Unreachable` when the advertisement is needed
    /// and cannot be fetched.
    pub async fn pinned(&self) -> Result<bool, CheckerError> {
        self.pinned
            .get_or_try_init(|| self.resolve_pinned())
            .await
            .copied()
    }

    async fn resolve_pinned(&self) -> Result<bool, CheckerError> {
        let local = self.local()?;
        let Some(source) = self.source.as_ref() else {
            return Err(CheckerError::NotGitDependency(self.dependency.name.clone()));
        };
        let Some(reference) = source.reference.as_deref() else {
            return Ok(false);
        };

        match source.branch.as_deref() {
            Some(branch) if branch == reference => return Ok(false),
            Some(_) => return Ok(true),
            None => {}
        }

        if self
            .dependency
            .version
            .as_deref()
            .is_some_and(|v| v.starts_with(reference))
        {
            return Ok(true);
        }

        if local.advertises(&format!("refs/tags/{}", reference)).await? {
            return Ok(true);
        }
        if !local.advertises(&format!("refs/heads/{}", reference)).await? {
            return Ok(true);
        }

        tracing::debug!(dependency = %self.dependency.name, reference, "ref is a live branch");
        Ok(self.consider_version_branches_pinned && is_version_tag(reference))
    }

    pub async fn pinned_ref_looks_like_version(&self) -> Result<bool, CheckerError> {
        if !self.pinned().await? {
            return Ok(false);
        }
        Ok(self.declared_ref().is_some_and(is_version_tag))
    }

    pub async fn pinned_ref_looks_like_commit_sha(&self) -> Result<bool, CheckerError> {
        match self.declared_ref() {
            Some(reference) => self.ref_looks_like_commit_sha(reference).await,
            None => Ok(false),
        }
    }

    /// Whether `reference` is a bare commit SHA: hex-shaped, pinned, and not
    /// the name of any advertised ref.
    pub async fn ref_looks_like_commit_sha(&self, reference: &str) -> Result<bool, CheckerError> {
        if !looks_like_commit_sha(reference) || !self.pinned().await? {
            return Ok(false);
        }
        Ok(self.local()?.head_commit_for_ref(reference).await?.is_none())
    }

    // --- commit lookups ---

    /// Commit behind the pinned ref when the ref is an advertised object SHA.
    pub async fn head_commit_for_pinned_ref(&self) -> Result<Option<String>, CheckerError> {
        let local = self.local()?;
        match self.declared_ref() {
            Some(reference) => Ok(local.head_commit_for_ref_sha(reference).await?),
            None => Ok(None),
        }
    }

    /// Commit of the declared ref or branch, or of `HEAD` if neither is set.
    ///
    /// # Errors
    ///
    /// `ReferenceNotFound` if the name is not advertised and the dependency is
    /// not pinned.
    pub async fn head_commit_for_current_branch(&self) -> Result<Option<String>, CheckerError> {
        let name = self.ref_or_branch().unwrap_or("HEAD");
        let sha = self.head_commit_for_local_branch(name).await?;
        if sha.is_some() || self.pinned().await? {
            return Ok(sha);
        }
        Err(CheckerError::ReferenceNotFound {
            dependency: self.dependency.name.clone(),
        })
    }

    /// Commit an advertised ref points at.
    ///
    /// A `tags/` prefix that the fetcher does not know about is retried
    /// without it.
    pub async fn head_commit_for_local_branch(
        &self,
        name: &str,
    ) -> Result<Option<String>, CheckerError> {
        let local = self.local()?;
        if let Some(sha) = local.head_commit_for_ref(name).await? {
            return Ok(Some(sha));
        }
        match name.strip_prefix(TAGS_PREFIX) {
            Some(bare) => Ok(local.head_commit_for_ref(bare).await?),
            None => Ok(None),
        }
    }

    // --- candidate sets ---

    async fn local_refs(&self) -> Result<Vec<GitRef>, CheckerError> {
        let refs = self.local()?.refs().await?;
        Ok(apply_tag_prefix(refs, self.declared_ref()))
    }

    async fn local_tags(&self) -> Result<Vec<GitRef>, CheckerError> {
        let tags = self.local()?.tags().await?;
        Ok(apply_tag_prefix(&tags, self.declared_ref()))
    }

    /// Tags eligible as upgrade targets.
    ///
    /// # Errors
    ///
    /// `AllVersionsIgnored` when `raise_on_ignored` is set and the ignore
    /// requirements removed every tag newer than the current version.
    pub async fn allowed_version_tags(&self) -> Result<Vec<GitRef>, CheckerError> {
        let tags = self.local_tags().await?;
        self.allowed_versions(tags).await
    }

    /// Like [`allowed_version_tags`](Self::allowed_version_tags), over
    /// branches and tags.
    pub async fn allowed_version_refs(&self) -> Result<Vec<GitRef>, CheckerError> {
        let refs = self.local_refs().await?;
        self.allowed_versions(refs).await
    }

    async fn allowed_versions(&self, refs: Vec<GitRef>) -> Result<Vec<GitRef>, CheckerError> {
        let anchor = self.prefix_anchor().await?;
        let tags: Vec<GitRef> = refs
            .into_iter()
            .filter(|r| is_version_tag(r.name()))
            .filter(|r| anchor.as_deref().map_or(true, |a| same_prefix(a, r.name())))
            .filter(|r| self.version_of(r).is_some())
            .collect();

        let filtered: Vec<GitRef> = tags
            .iter()
            .filter(|t| !self.is_ignored(t))
            .cloned()
            .collect();
        if filtered.len() < tags.len() {
            tracing::debug!(
                dependency = %self.dependency.name,
                ignored = tags.len() - filtered.len(),
                "skipping ignored versions"
            );
        }

        if self.raise_on_ignored
            && self.filter_lower_versions(&filtered).is_empty()
            && !self.filter_lower_versions(&tags).is_empty()
        {
            return Err(CheckerError::AllVersionsIgnored {
                dependency: self.dependency.name.clone(),
            });
        }

        let wants_prerelease = self.wants_prerelease().await?;
        Ok(filtered
            .into_iter()
            .filter(|t| wants_prerelease || !self.is_prerelease(t))
            .collect())
    }

    /// Name whose prefix candidates must share, if any.
    ///
    /// A version-shaped declared ref or branch anchors directly. Otherwise a
    /// SHA pin anchors on the most specific version tag at that commit.
    async fn prefix_anchor(&self) -> Result<Option<String>, CheckerError> {
        if let Some(reference) = self.ref_or_branch().filter(|r| is_version_tag(r)) {
            return Ok(Some(reference.to_string()));
        }
        self.local_tag_for_pinned_sha().await
    }

    async fn wants_prerelease(&self) -> Result<bool, CheckerError> {
        let Some(reference) = self.declared_ref() else {
            return Ok(false);
        };
        if !self.pinned_ref_looks_like_version().await? {
            return Ok(false);
        }
        Ok(self
            .version_from_name(reference)
            .is_some_and(|v| v.is_prerelease()))
    }

    fn is_ignored(&self, tag: &GitRef) -> bool {
        self.version_of(tag)
            .is_some_and(|v| self.scheme.any_satisfied(&self.ignored, &v))
    }

    fn is_prerelease(&self, tag: &GitRef) -> bool {
        self.version_of(tag).is_some_and(|v| v.is_prerelease())
    }

    // --- versions ---

    fn version_from_name(&self, name: &str) -> Option<S::Version> {
        let raw = scan_version(name)?;
        self.scheme.parse_version(raw).ok()
    }

    fn version_of(&self, tag: &GitRef) -> Option<S::Version> {
        self.version_from_name(tag.name())
    }

    /// The dependency's current version, when it is version-shaped.
    pub fn current_version(&self) -> Option<S::Version> {
        let version = self.dependency.version.as_deref()?;
        if !is_version_tag(version) {
            return None;
        }
        self.version_from_name(version)
    }

    /// Tags newer than the current version; all of them if there is none.
    pub fn filter_lower_versions(&self, tags: &[GitRef]) -> Vec<GitRef> {
        let Some(current) = self.current_version() else {
            return tags.to_vec();
        };
        tags.iter()
            .filter(|t| self.version_of(t).is_some_and(|v| v > current))
            .cloned()
            .collect()
    }

    fn to_local_tag(&self, tag: &GitRef) -> Option<LocalTag<S::Version>> {
        Some(LocalTag {
            tag: tag.name().to_string(),
            version: self.version_of(tag)?,
            commit_sha: tag.commit_sha().to_string(),
            tag_sha: tag.ref_sha().to_string(),
        })
    }

    /// Highest version; the first seen wins a tie.
    fn max_local_tag(&self, tags: &[GitRef]) -> Option<LocalTag<S::Version>> {
        tags.iter()
            .filter_map(|t| self.to_local_tag(t))
            .reduce(|best, next| if next.version > best.version { next } else { best })
    }

    fn select_by_precision(
        &self,
        tags: Vec<GitRef>,
        keep: impl Fn(usize, usize) -> bool,
    ) -> Vec<GitRef> {
        let Some(current) = self.dependency.version.as_deref().map(precision) else {
            return Vec::new();
        };
        tags.into_iter()
            .filter(|t| {
                let version = scan_version(t.name()).unwrap_or(t.name());
                keep(precision(version), current)
            })
            .collect()
    }

    // --- selections ---

    pub async fn local_tag_for_latest_version(
        &self,
    ) -> Result<Option<LocalTag<S::Version>>, CheckerError> {
        let tags = self.allowed_version_tags().await?;
        Ok(self.max_local_tag(&tags))
    }

    /// Candidate set for the precision selections: tags when the pin is a SHA
    /// that a version tag points at, every ref otherwise.
    async fn precision_candidates(&self) -> Result<Vec<GitRef>, CheckerError> {
        if self.local_tag_for_pinned_sha().await?.is_some() {
            self.allowed_version_tags().await
        } else {
            self.allowed_version_refs().await
        }
    }

    /// Latest candidate with exactly as many components as the current
    /// version.
    pub async fn local_ref_for_latest_version_matching_existing_precision(
        &self,
    ) -> Result<Option<LocalTag<S::Version>>, CheckerError> {
        let candidates = self.precision_candidates().await?;
        let same = self.select_by_precision(candidates, |tag, current| tag == current);
        Ok(self.max_local_tag(&same))
    }

    /// Latest candidate with at most as many components as the current
    /// version.
    pub async fn local_ref_for_latest_version_lower_precision(
        &self,
    ) -> Result<Option<LocalTag<S::Version>>, CheckerError> {
        let candidates = self.precision_candidates().await?;
        let lower = self.select_by_precision(candidates, |tag, current| tag <= current);
        Ok(self.max_local_tag(&lower))
    }

    pub async fn local_tags_for_allowed_versions(
        &self,
    ) -> Result<Vec<LocalTag<S::Version>>, CheckerError> {
        let tags = self.allowed_version_tags().await?;
        Ok(tags.iter().filter_map(|t| self.to_local_tag(t)).collect())
    }

    pub async fn local_tags_for_allowed_versions_matching_existing_precision(
        &self,
    ) -> Result<Vec<LocalTag<S::Version>>, CheckerError> {
        let tags = self.allowed_version_tags().await?;
        let same = self.select_by_precision(tags, |tag, current| tag == current);
        Ok(same.iter().filter_map(|t| self.to_local_tag(t)).collect())
    }

    // --- SHA pins ---

    /// Most specific version tag at the commit the declared ref resolves to.
    pub async fn most_specific_tag_equivalent_to_pinned_ref(
        &self,
    ) -> Result<Option<String>, CheckerError> {
        let Some(reference) = self.declared_ref() else {
            return Ok(None);
        };
        match self.head_commit_for_local_branch(reference).await? {
            Some(sha) => self.most_specific_version_tag_for_sha(&sha).await,
            None => Ok(None),
        }
    }

    /// Most specific version tag at the pinned commit, when the pin is a bare
    /// SHA. Memoized.
    pub async fn local_tag_for_pinned_sha(&self) -> Result<Option<String>, CheckerError> {
        self.pinned_sha_tag
            .get_or_try_init(|| async {
                if !self.pinned_ref_looks_like_commit_sha().await? {
                    return Ok(None);
                }
                match self.declared_ref() {
                    Some(sha) => self.most_specific_version_tag_for_sha(sha).await,
                    None => Ok(None),
                }
            })
            .await
            .cloned()
    }

    async fn most_specific_version_tag_for_sha(
        &self,
        commit_sha: &str,
    ) -> Result<Option<String>, CheckerError> {
        let tags = self.local_tags().await?;
        let best = tags
            .iter()
            .filter(|t| t.commit_sha() == commit_sha && is_version_tag(t.name()))
            .filter_map(|t| self.version_of(t).map(|v| (v, t.name())))
            .reduce(|best, next| if next.0 > best.0 { next } else { best });
        Ok(best.map(|(_, name)| name.to_string()))
    }

    // --- reachability ---

    /// Whether the dependency's repository answers at all.
    ///
    /// # Errors
    ///
    /// Upstream failures other than plain unreachability are passed on.
    pub async fn git_repo_reachable(&self) -> Result<bool, CheckerError> {
        match self.local()?.upload_pack().await {
            Ok(_) => Ok(true),
            Err(FetchError::Unreachable { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
