//! forge::github
//!
//! GitHub compare client.
//!
//! # Design
//!
//! Uses the REST "compare two commits" endpoint:
//!
//! ```text
//! GET /repos/{owner}/{repo}/compare/{base}...{head}
//! ```
//!
//! and returns its `status` field as-is. The token is optional; public
//! repositories can be compared anonymously (with a much lower rate limit).
//!
//! # Example
//!
//! ```no_run
//! use gitpin::forge::github::GitHubForge;
//! use gitpin::forge::Forge;
//!
//! # async fn example() -> Result<(), gitpin::forge::ForgeError> {
//! let forge = GitHubForge::new(None, "gocardless", "business");
//! let status = forge.compare("v1.5.0", "a1b78a9").await?;
//! println!("{}", status);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};
use serde::Deserialize;

use super::traits::{CompareStatus, Forge, ForgeError};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gitpin";

/// GitHub compare client for one repository.
pub struct GitHubForge {
    client: Client,
    token: Option<String>,
    owner: String,
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &self.token.is_some())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    pub fn new(token: Option<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::with_api_base(token, owner, repo, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base (GitHub Enterprise, tests).
    pub fn with_api_base(
        token: Option<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token,
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Build from a `owner/repo` path.
    pub fn from_repo_path(token: Option<String>, path: &str, api_base: &str) -> Option<Self> {
        let (owner, repo) = path.split_once('/')?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self::with_api_base(token, owner, repo, api_base))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(&self, response: Response) -> Result<T, ForgeError> {
        let status = response.status();
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(if status.is_server_error() {
            ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            }
        } else {
            ForgeError::from_status(status.as_u16(), message)
        })
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareStatus, ForgeError> {
        let url = self.repo_url(&format!("compare/{}...{}", base, head));
        tracing::debug!(%url, "comparing commits on github");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return self.handle_error_response(response).await;
        }

        let status = response.status().as_u16();
        let comparison: GitHubComparison =
            response.json().await.map_err(|e| ForgeError::ApiError {
                status,
                message: format!("Failed to parse response: {}", e),
            })?;
        Ok(CompareStatus::parse(&comparison.status))
    }
}

#[derive(Debug, Deserialize)]
struct GitHubComparison {
    status: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
}
