//! checker::release
//!
//! Whether the pinned ref or tracked branch is already part of a published
//! release.
//!
//! # Design
//!
//! The authority for "published" is the listing source: the repository the
//! package registry advertises, which may differ from the git source the
//! manifest points at. Its tags are fetched through a second
//! [`GitReferenceFetcher`](crate::git::GitReferenceFetcher); the release tag
//! for a version is compared against the dependency's ref with a single
//! compare call on the listing source's forge.
//!
//! Everything on the listing side degrades to "not included": a failed
//! registry lookup, an unreachable listing repository, an unknown provider,
//! or a permanent compare error (not found, server error). Only auth, rate
//! limit and network failures of the compare API are reported.

use super::resolver::PinResolver;
use super::tag_pattern::listing_tag_matches;
use super::CheckerError;
use crate::forge::RepoSource;
use crate::git::{apply_tag_prefix, GitRef};
use crate::version::VersionScheme;

impl<S: VersionScheme> PinResolver<S> {
    /// Repository URL the registry lists for this dependency. Memoized.
    pub async fn listing_source_url(&self) -> Option<&str> {
        self.listing_source_url
            .get_or_init(|| async {
                let candidate = self.dependency.without_sources();
                match self.context.finder.source_url(&candidate).await {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!(
                            dependency = %self.dependency.name,
                            error = %e,
                            "listing source lookup failed"
                        );
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    /// Tags of the listing source. Memoized; fetch failures yield no tags.
    pub async fn listing_tags(&self) -> &[GitRef] {
        self.listing_tags
            .get_or_init(|| async {
                let Some(url) = self.listing_source_url().await else {
                    return Vec::new();
                };
                match self.context.fetcher(url).tags().await {
                    Ok(tags) => apply_tag_prefix(&tags, self.declared_ref()),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "listing source unreachable");
                        Vec::new()
                    }
                }
            })
            .await
            .as_slice()
    }

    /// First listing tag naming `version`, e.g. `v1.2.0` for `1.2.0`.
    pub async fn listing_tag_for_version(&self, version: &str) -> Option<String> {
        self.listing_tags()
            .await
            .iter()
            .find(|t| listing_tag_matches(t.name(), version))
            .map(|t| t.name().to_string())
    }

    /// Whether the pinned ref is at or behind the release of `version`.
    pub async fn pinned_ref_in_release(&self, version: &str) -> Result<bool, CheckerError> {
        self.local()?;
        if !self.pinned().await? {
            return Ok(false);
        }
        let Some(reference) = self.declared_ref() else {
            return Ok(false);
        };
        let Some(tag) = self.release_tag(version).await else {
            return Ok(false);
        };
        self.commit_included_in_tag(&tag, reference, true).await
    }

    /// Whether the declared ref or branch is strictly behind the release of
    /// `version`. Being identical to the release does not count.
    pub async fn branch_behind_release(&self, version: &str) -> Result<bool, CheckerError> {
        self.local()?;
        let Some(commit) = self.ref_or_branch() else {
            return Ok(false);
        };
        let Some(tag) = self.release_tag(version).await else {
            return Ok(false);
        };
        self.commit_included_in_tag(&tag, commit, false).await
    }

    pub async fn branch_or_ref_in_release(&self, version: &str) -> Result<bool, CheckerError> {
        if self.pinned_ref_in_release(version).await? {
            return Ok(true);
        }
        self.branch_behind_release(version).await
    }

    async fn release_tag(&self, version: &str) -> Option<String> {
        self.listing_source_url().await?;
        self.listing_tag_for_version(version).await
    }

    /// Ask the listing source's forge where `commit` stands relative to
    /// `tag`.
    async fn commit_included_in_tag(
        &self,
        tag: &str,
        commit: &str,
        allow_identical: bool,
    ) -> Result<bool, CheckerError> {
        let Some(url) = self.listing_source_url().await else {
            return Ok(false);
        };
        let Some(source) = RepoSource::from_url(url) else {
            tracing::debug!(url, "unknown listing source provider");
            return Ok(false);
        };

        let result = match self.context.forges.forge_for(&source) {
            Ok(forge) => forge.compare(tag, commit).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(status) => {
                tracing::debug!(
                    provider = %source.provider,
                    repo = %source.repo,
                    tag,
                    commit,
                    %status,
                    "compared against release"
                );
                Ok(status.is_included(allow_identical))
            }
            Err(e) if e.is_permanent() => {
                tracing::debug!(repo = %source.repo, error = %e, "comparison unavailable");
                Ok(false)
            }
            Err(e) => Err(CheckerError::Forge(e)),
        }
    }
}
