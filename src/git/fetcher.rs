//! git::fetcher
//!
//! Memoized ref discovery for one repository URL.
//!
//! # Failure Policy
//!
//! 1. `GET <url>.git/info/refs?service=git-upload-pack`; a 200 body wins.
//! 2. Anything else falls back to `git ls-remote <url>.git` with terminal
//!    prompts disabled; a successful exit wins.
//! 3. When both fail, github.com answering 5xx is reported as
//!    [`FetchError::Upstream`]; every other failure is
//!    [`FetchError::Unreachable`].
//!
//! Known hosts log the failure at `warn`, private hosts at `debug`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitpin::core::credentials::Credentials;
//! use gitpin::git::{GitReferenceFetcher, ReqwestTransport, SystemCommandRunner};
//! use gitpin::core::config::TransportSettings;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = GitReferenceFetcher::new(
//!     "https://github.com/gocardless/business",
//!     Credentials::default(),
//!     Arc::new(ReqwestTransport::new(&TransportSettings::default())?),
//!     Arc::new(SystemCommandRunner::default()),
//! );
//! for tag in fetcher.tags().await? {
//!     println!("{} {}", tag.name(), tag.commit_sha());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;

use super::advertisement;
use super::reference::GitRef;
use super::transport::{CommandRunner, HttpTransport};
use super::url::{is_github, is_known_host, ls_remote_url, service_pack_request};
use crate::core::credentials::Credentials;

/// Errors from ref discovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Neither smart HTTP nor `git ls-remote` produced an advertisement.
    #[error("git dependency unreachable: {}", urls.join(", "))]
    Unreachable { urls: Vec<String> },

    /// The host itself is failing (GitHub 5xx).
    #[error("upstream error {status} from {url}")]
    Upstream { status: u16, url: String },

    /// The repository URL cannot be turned into a request.
    #[error("invalid repository url: {0}")]
    InvalidUrl(String),
}

/// Fetches and parses the ref advertisement of one repository.
///
/// The advertisement is requested at most once per instance; every query
/// method works from the memoized copy.
pub struct GitReferenceFetcher {
    url: String,
    credentials: Credentials,
    http: Arc<dyn HttpTransport>,
    runner: Arc<dyn CommandRunner>,
    upload_pack: OnceCell<String>,
    refs: OnceCell<Vec<GitRef>>,
}

impl std::fmt::Debug for GitReferenceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitReferenceFetcher")
            .field("url", &self.url)
            .field("fetched", &self.upload_pack.initialized())
            .finish()
    }
}

impl GitReferenceFetcher {
    pub fn new(
        url: impl Into<String>,
        credentials: Credentials,
        http: Arc<dyn HttpTransport>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            url: url.into(),
            credentials,
            http,
            runner,
            upload_pack: OnceCell::new(),
            refs: OnceCell::new(),
        }
    }

    /// Repository URL as given.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw advertisement text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when both transports fail. Failures are not
    /// memoized; a later call tries again.
    pub async fn upload_pack(&self) -> Result<&str, FetchError> {
        self.upload_pack
            .get_or_try_init(|| self.fetch_upload_pack())
            .await
            .map(String::as_str)
    }

    /// All advertised branches and tags, in advertisement order.
    pub async fn refs(&self) -> Result<&[GitRef], FetchError> {
        let raw = self.upload_pack().await?;
        let refs = self
            .refs
            .get_or_init(|| async { advertisement::parse(raw) })
            .await;
        Ok(refs.as_slice())
    }

    /// Advertised tags only.
    pub async fn tags(&self) -> Result<Vec<GitRef>, FetchError> {
        Ok(self
            .refs()
            .await?
            .iter()
            .filter(|r| r.is_tag())
            .cloned()
            .collect())
    }

    pub async fn ref_names(&self) -> Result<Vec<String>, FetchError> {
        Ok(self
            .refs()
            .await?
            .iter()
            .map(|r| r.name().to_string())
            .collect())
    }

    /// Commit a ref points at. `"HEAD"` reads the symbolic HEAD line.
    pub async fn head_commit_for_ref(&self, name: &str) -> Result<Option<String>, FetchError> {
        if name == "HEAD" {
            return Ok(advertisement::head_sha(self.upload_pack().await?));
        }
        Ok(self
            .refs()
            .await?
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.commit_sha().to_string()))
    }

    /// Commit behind an advertised object SHA (resolves tag objects).
    pub async fn head_commit_for_ref_sha(&self, sha: &str) -> Result<Option<String>, FetchError> {
        Ok(self
            .refs()
            .await?
            .iter()
            .find(|r| r.ref_sha() == sha)
            .map(|r| r.commit_sha().to_string()))
    }

    /// Whether the raw advertisement lists `full_ref_name`.
    pub async fn advertises(&self, full_ref_name: &str) -> Result<bool, FetchError> {
        Ok(advertisement::advertises(
            self.upload_pack().await?,
            full_ref_name,
        ))
    }

    /// Whether an advertisement can be fetched at all.
    pub async fn is_reachable(&self) -> bool {
        self.upload_pack().await.is_ok()
    }

    async fn fetch_upload_pack(&self) -> Result<String, FetchError> {
        let request = service_pack_request(&self.url, &self.credentials)?;
        tracing::debug!(url = %request.url, "fetching ref advertisement");

        let http_status = match self.http.get(&request.url, request.auth.as_ref()).await {
            Ok(response) if response.is_ok() => return Ok(response.body),
            Ok(response) => {
                tracing::debug!(status = response.status, url = %self.url, "advertisement request failed");
                Some(response.status)
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %self.url, "advertisement request errored");
                None
            }
        };

        if let Some(body) = self.ls_remote().await {
            return Ok(body);
        }

        if let Some(status) = http_status.filter(|s| *s >= 500) {
            if is_github(&self.url) {
                tracing::warn!(status, url = %self.url, "upstream error fetching refs");
                return Err(FetchError::Upstream {
                    status,
                    url: self.url.clone(),
                });
            }
        }

        if is_known_host(&self.url) {
            tracing::warn!(url = %self.url, "git dependency unreachable");
        } else {
            tracing::debug!(url = %self.url, "git dependency unreachable");
        }
        Err(FetchError::Unreachable {
            urls: vec![self.url.clone()],
        })
    }

    /// `git ls-remote` stdout, or `None` if the command failed.
    async fn ls_remote(&self) -> Option<String> {
        let target = ls_remote_url(&self.url);
        let path = std::env::var("PATH").unwrap_or_default();
        let env = [("GIT_TERMINAL_PROMPT", "0"), ("PATH", path.as_str())];

        match self.runner.run("git", &["ls-remote", &target], &env).await {
            Ok(output) if output.success => Some(output.stdout),
            Ok(output) => {
                tracing::debug!(stderr = %output.stderr.trim(), "git ls-remote failed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "git ls-remote could not run");
                None
            }
        }
    }
}
