//! forge::gitlab
//!
//! GitLab compare client.
//!
//! # Design
//!
//! GitLab's compare endpoint lists the commits reachable from `to` but not
//! from `from`:
//!
//! ```text
//! GET /projects/{url-encoded path}/repository/compare?from={base}&to={head}
//! ```
//!
//! When the response's `compare_same_ref` flag is set both refs resolve to
//! the same commit (identical). Otherwise no commits means `head` is already
//! in `base` (behind), and any commit means `head` is ahead.
//!
//! Project paths may contain nested groups (`group/subgroup/project`), so
//! the whole path is encoded as one segment.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;

use super::traits::{CompareStatus, Forge, ForgeError};

/// Default GitLab API base URL.
pub const DEFAULT_API_BASE: &str = "https://gitlab.com/api/v4";

/// GitLab compare client for one project.
#[derive(Clone)]
pub struct GitLabForge {
    client: Client,
    token: Option<String>,
    /// Full project path, e.g. `group/subgroup/project`
    project: String,
    /// API base URL (for self-hosted GitLab)
    api_base: String,
}

impl std::fmt::Debug for GitLabForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabForge")
            .field("has_token", &self.token.is_some())
            .field("project", &self.project)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitLabForge {
    pub fn new(token: Option<String>, project: impl Into<String>) -> Self {
        Self::with_api_base(token, project, DEFAULT_API_BASE)
    }

    pub fn with_api_base(
        token: Option<String>,
        project: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token,
            project: project.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn compare_url(&self, base: &str, head: &str) -> String {
        format!(
            "{}/projects/{}/repository/compare?from={}&to={}",
            self.api_base,
            urlencoding::encode(&self.project),
            urlencoding::encode(base),
            urlencoding::encode(head)
        )
    }

    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(token)
                .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?;
            headers.insert("PRIVATE-TOKEN", value);
        }
        headers.insert(USER_AGENT, HeaderValue::from_static("gitpin"));
        Ok(headers)
    }
}

#[async_trait]
impl Forge for GitLabForge {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareStatus, ForgeError> {
        let url = self.compare_url(base, head);
        tracing::debug!(%url, "comparing commits on gitlab");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<GitLabErrorResponse>().await {
                Ok(err) => err.message,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(ForgeError::from_status(status.as_u16(), message));
        }

        let comparison: GitLabComparison =
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })?;
        Ok(comparison.status())
    }
}

#[derive(Debug, Deserialize)]
struct GitLabComparison {
    #[serde(default)]
    commits: Vec<serde_json::Value>,
    #[serde(default)]
    compare_same_ref: bool,
}

impl GitLabComparison {
    fn status(&self) -> CompareStatus {
        if self.compare_same_ref {
            CompareStatus::Identical
        } else if self.commits.is_empty() {
            CompareStatus::Behind
        } else {
            CompareStatus::Ahead
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitLabErrorResponse {
    #[serde(alias = "error")]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_url_encodes_nested_groups() {
        let forge = GitLabForge::new(None, "org/sub/project");
        assert_eq!(
            forge.compare_url("v2.0.0", "main"),
            "https://gitlab.com/api/v4/projects/org%2Fsub%2Fproject/repository/compare?from=v2.0.0&to=main"
        );
    }

    #[test]
    fn comparison_status() {
        let parse = |json: &str| -> CompareStatus {
            serde_json::from_str::<GitLabComparison>(json)
                .unwrap()
                .status()
        };
        assert_eq!(parse(r#"{"commits": []}"#), CompareStatus::Behind);
        assert_eq!(
            parse(r#"{"commits": [], "compare_same_ref": true}"#),
            CompareStatus::Identical
        );
        assert_eq!(
            parse(r#"{"commits": [{"id": "a"}], "compare_same_ref": false}"#),
            CompareStatus::Ahead
        );
    }

    #[test]
    fn private_token_header() {
        let forge = GitLabForge::new(Some("glpat-x".into()), "a/b");
        assert_eq!(forge.headers().unwrap()["PRIVATE-TOKEN"], "glpat-x");
        assert!(!format!("{:?}", forge).contains("glpat-x"));
    }
}
