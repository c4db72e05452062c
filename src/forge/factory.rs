//! forge::factory
//!
//! Provider detection and forge creation.
//!
//! # Design
//!
//! The pin resolver only knows a repository URL. This module turns that URL
//! into a [`RepoSource`] (which provider, which repository) and hands out a
//! boxed [`Forge`] for it through the [`ForgeFactory`] trait, so the resolver
//! never imports a concrete client.
//!
//! # Provider Detection
//!
//! - `github.com/<owner>/<repo>` → GitHub
//! - `gitlab.com/<group>/.../<project>` → GitLab
//! - `bitbucket.org/<workspace>/<repo>` → Bitbucket
//! - `git-codecommit.<region>.amazonaws.com/v1/repos/<name>` → CodeCommit
//!
//! # Example
//!
//! ```
//! use gitpin::forge::{detect_provider, ForgeProvider, RepoSource};
//!
//! let source = RepoSource::from_url("git@gitlab.com:org/sub/project.git").unwrap();
//! assert_eq!(source.provider, ForgeProvider::GitLab);
//! assert_eq!(source.repo, "org/sub/project");
//!
//! assert_eq!(
//!     detect_provider("https://github.com/gocardless/business"),
//!     Some(ForgeProvider::GitHub)
//! );
//! ```

use reqwest::Client;

use super::bitbucket::BitbucketForge;
use super::codecommit::CodeCommitForge;
use super::github::GitHubForge;
use super::gitlab::GitLabForge;
use super::traits::{Forge, ForgeError};
use crate::core::config::ForgeSettings;
use crate::core::credentials::Credentials;
use crate::git::url::scp_to_standard;

/// Supported forge providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForgeProvider {
    GitHub,
    GitLab,
    Bitbucket,
    /// No compare API; comparisons are always unknown.
    CodeCommit,
}

impl ForgeProvider {
    /// Get the provider name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => "github",
            ForgeProvider::GitLab => "gitlab",
            ForgeProvider::Bitbucket => "bitbucket",
            ForgeProvider::CodeCommit => "codecommit",
        }
    }

    /// Parse a provider from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "github" => Some(ForgeProvider::GitHub),
            "gitlab" => Some(ForgeProvider::GitLab),
            "bitbucket" => Some(ForgeProvider::Bitbucket),
            "codecommit" => Some(ForgeProvider::CodeCommit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A repository on a known provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSource {
    pub provider: ForgeProvider,
    /// Lowercased host, e.g. `github.com`.
    pub hostname: String,
    /// Provider-specific repository path (`owner/repo`, nested GitLab path,
    /// or the CodeCommit repository name).
    pub repo: String,
}

impl RepoSource {
    /// Recognize a repository URL (HTTPS, SSH, or SCP-style).
    ///
    /// Returns `None` for hosts that are not one of the known providers.
    pub fn from_url(url: &str) -> Option<Self> {
        let standard = scp_to_standard(url.trim());
        let parsed = url::Url::parse(&standard).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let hostname = host.strip_prefix("www.").unwrap_or(&host).to_string();

        let path = parsed.path().trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (provider, repo) = match hostname.as_str() {
            "github.com" => (ForgeProvider::GitHub, owner_and_repo(&segments)?),
            "bitbucket.org" => (ForgeProvider::Bitbucket, owner_and_repo(&segments)?),
            "gitlab.com" => {
                // Web URLs such as `group/project/-/tree/main` end the project at `-`.
                let project: Vec<&str> = segments
                    .iter()
                    .copied()
                    .take_while(|s| *s != "-")
                    .collect();
                if project.len() < 2 {
                    return None;
                }
                (ForgeProvider::GitLab, project.join("/"))
            }
            host if is_codecommit_host(host) => match segments.as_slice() {
                ["v1", "repos", name, ..] => (ForgeProvider::CodeCommit, name.to_string()),
                _ => return None,
            },
            _ => return None,
        };

        Some(Self {
            provider,
            hostname,
            repo,
        })
    }
}

fn owner_and_repo(segments: &[&str]) -> Option<String> {
    match segments {
        [owner, repo, ..] => Some(format!("{}/{}", owner, repo.trim_end_matches(".git"))),
        _ => None,
    }
}

fn is_codecommit_host(host: &str) -> bool {
    host.starts_with("git-codecommit.") && host.ends_with(".amazonaws.com")
}

/// Detect the forge provider from a repository URL.
pub fn detect_provider(url: &str) -> Option<ForgeProvider> {
    RepoSource::from_url(url).map(|source| source.provider)
}

/// Creates compare clients for repositories.
pub trait ForgeFactory: Send + Sync {
    fn forge_for(&self, source: &RepoSource) -> Result<Box<dyn Forge>, ForgeError>;
}

/// Factory that builds real API clients.
///
/// Tokens come from the `git_source` credential for the repository's host;
/// API bases come from [`ForgeSettings`].
#[derive(Debug, Clone)]
pub struct DefaultForgeFactory {
    client: Client,
    credentials: Credentials,
    settings: ForgeSettings,
}

impl DefaultForgeFactory {
    pub fn new(credentials: Credentials, settings: ForgeSettings) -> Self {
        Self::with_client(Client::new(), credentials, settings)
    }

    /// Share one HTTP client between every forge this factory creates.
    pub fn with_client(client: Client, credentials: Credentials, settings: ForgeSettings) -> Self {
        Self {
            client,
            credentials,
            settings,
        }
    }
}

impl ForgeFactory for DefaultForgeFactory {
    fn forge_for(&self, source: &RepoSource) -> Result<Box<dyn Forge>, ForgeError> {
        let token = self.credentials.token_for_host(&source.hostname);
        let client = self.client.clone();

        let forge: Box<dyn Forge> = match source.provider {
            ForgeProvider::GitHub => Box::new(
                GitHubForge::from_repo_path(token, &source.repo, &self.settings.github_api)
                    .ok_or_else(|| ForgeError::NotFound(source.repo.clone()))?
                    .with_client(client),
            ),
            ForgeProvider::GitLab => Box::new(
                GitLabForge::with_api_base(token, &source.repo, &self.settings.gitlab_api)
                    .with_client(client),
            ),
            ForgeProvider::Bitbucket => Box::new(
                BitbucketForge::with_api_base(token, &source.repo, &self.settings.bitbucket_api)
                    .with_client(client),
            ),
            ForgeProvider::CodeCommit => Box::new(CodeCommitForge::new(&source.repo)),
        };
        Ok(forge)
    }
}
