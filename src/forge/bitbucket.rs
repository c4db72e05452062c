//! forge::bitbucket
//!
//! Bitbucket Cloud compare client.
//!
//! Bitbucket has no compare endpoint with a status, so the client lists the
//! commits reachable from `head` but not from `base`:
//!
//! ```text
//! GET /repositories/{workspace}/{repo}/commits/?include={head}&exclude={base}
//! ```
//!
//! An empty `values` page means `head` is behind `base`. Everything else,
//! including a body without `values` or one that does not parse, is
//! reported as ahead so that a bad answer never claims inclusion.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;

use super::traits::{CompareStatus, Forge, ForgeError};

/// Default Bitbucket API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.bitbucket.org/2.0";

/// Bitbucket compare client for one repository.
#[derive(Clone)]
pub struct BitbucketForge {
    client: Client,
    token: Option<String>,
    /// `workspace/repo`
    repo: String,
    api_base: String,
}

impl std::fmt::Debug for BitbucketForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbucketForge")
            .field("has_token", &self.token.is_some())
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl BitbucketForge {
    pub fn new(token: Option<String>, repo: impl Into<String>) -> Self {
        Self::with_api_base(token, repo, DEFAULT_API_BASE)
    }

    pub fn with_api_base(
        token: Option<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token,
            repo: repo.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn commits_url(&self, base: &str, head: &str) -> String {
        format!(
            "{}/repositories/{}/commits/?include={}&exclude={}",
            self.api_base,
            self.repo,
            urlencoding::encode(head),
            urlencoding::encode(base)
        )
    }

    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(USER_AGENT, HeaderValue::from_static("gitpin"));
        Ok(headers)
    }
}

/// Status for a commit-listing body.
fn status_for_body(body: &str) -> CompareStatus {
    match serde_json::from_str::<BitbucketCommitPage>(body) {
        Ok(BitbucketCommitPage {
            values: Some(values),
        }) if values.is_empty() => CompareStatus::Behind,
        _ => CompareStatus::Ahead,
    }
}

#[async_trait]
impl Forge for BitbucketForge {
    fn name(&self) -> &'static str {
        "bitbucket"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareStatus, ForgeError> {
        let url = self.commits_url(base, head);
        tracing::debug!(%url, "listing commits on bitbucket");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<BitbucketErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ForgeError::from_status(status.as_u16(), message));
        }

        Ok(status_for_body(&body))
    }
}

#[derive(Debug, Deserialize)]
struct BitbucketCommitPage {
    #[serde(default)]
    values: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct BitbucketErrorResponse {
    error: BitbucketErrorDetail,
}

#[derive(Debug, Deserialize)]
struct BitbucketErrorDetail {
    message: String,
}
