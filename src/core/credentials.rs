//! core::credentials
//!
//! Read-only credential set supplied by the caller.
//!
//! # Security
//!
//! - Passwords and tokens are never logged or included in `Debug` output
//! - Credentials are only matched by exact host; there is no wildcarding

use serde::{Deserialize, Serialize};

/// Credential kind used for git hosts.
pub const GIT_SOURCE: &str = "git_source";

/// A single credential entry.
///
/// Mirrors the `[[credentials]]` table in the config file:
///
/// ```toml
/// [[credentials]]
/// type = "git_source"
/// host = "github.com"
/// username = "x-access-token"
/// password = "ghp_..."
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Credential kind, e.g. `git_source`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Host the credential applies to.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Password or token.
    #[serde(default)]
    pub password: Option<String>,
}

impl Credential {
    /// Build a `git_source` credential.
    pub fn git_source(host: &str, username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            kind: GIT_SOURCE.to_string(),
            host: Some(host.to_string()),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    /// Basic auth pair, only when both halves are present.
    pub fn basic_auth(&self) -> Option<BasicAuth> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// Token for API clients (the password field).
    pub fn token(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    fn is_git_source_for(&self, host: &str) -> bool {
        self.kind == GIT_SOURCE
            && self
                .host
                .as_deref()
                .is_some_and(|h| h.eq_ignore_ascii_case(host))
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

/// HTTP basic auth pair.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Opaque, queryable list of credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Vec<Credential>);

impl Credentials {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self(credentials)
    }

    /// First `git_source` credential for `host`.
    pub fn git_source_for_host(&self, host: &str) -> Option<&Credential> {
        self.0.iter().find(|c| c.is_git_source_for(host))
    }

    /// Every `git_source` credential for `host`, in declaration order.
    pub fn git_sources_for_host<'a>(
        &'a self,
        host: &'a str,
    ) -> impl Iterator<Item = &'a Credential> + 'a {
        self.0.iter().filter(move |c| c.is_git_source_for(host))
    }

    /// API token for `host`, if a `git_source` credential carries one.
    pub fn token_for_host(&self, host: &str) -> Option<String> {
        self.git_source_for_host(host)
            .and_then(|c| c.token())
            .map(str::to_string)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Credential>> for Credentials {
    fn from(credentials: Vec<Credential>) -> Self {
        Self(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new(vec![
            Credential {
                kind: "docker_registry".to_string(),
                host: Some("github.com".to_string()),
                username: None,
                password: Some("wrong".to_string()),
            },
            Credential::git_source("github.com", Some("x-access-token"), Some("s3cr3t-pat")),
            Credential::git_source("bitbucket.org", None, None),
        ])
    }

    #[test]
    fn finds_git_source_by_host() {
        let creds = creds();
        let cred = creds.git_source_for_host("github.com").unwrap();
        assert_eq!(cred.password.as_deref(), Some("s3cr3t-pat"));
        assert!(creds.git_source_for_host("GitHub.com").is_some());
        assert!(creds.git_source_for_host("gitlab.com").is_none());
    }

    #[test]
    fn found_credential_outlives_host_lookup_key() {
        let creds = creds();
        let cred = {
            let host = String::from("GITHUB.COM").to_lowercase();
            creds.git_source_for_host(&host)
        };
        assert_eq!(cred.and_then(|c| c.username.as_deref()), Some("x-access-token"));
    }

    #[test]
    fn basic_auth_requires_both_halves() {
        let creds = creds();
        assert!(creds
            .git_source_for_host("github.com")
            .unwrap()
            .basic_auth()
            .is_some());
        assert!(creds
            .git_source_for_host("bitbucket.org")
            .unwrap()
            .basic_auth()
            .is_none());
    }

    #[test]
    fn token_for_host() {
        let creds = creds();
        assert_eq!(
            creds.token_for_host("github.com").as_deref(),
            Some("s3cr3t-pat")
        );
        assert_eq!(creds.token_for_host("bitbucket.org"), None);
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = creds();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("s3cr3t-pat"));
        assert!(!debug.contains("wrong"));

        let auth = creds
            .git_source_for_host("github.com")
            .unwrap()
            .basic_auth()
            .unwrap();
        let debug = format!("{:?}", auth);
        assert!(debug.contains("x-access-token"));
        assert!(!debug.contains("s3cr3t-pat"));
    }

    #[test]
    fn deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            credentials: Credentials,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[credentials]]
            type = "git_source"
            host = "github.com"
            username = "x-access-token"
            password = "token"
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.credentials.token_for_host("github.com").as_deref(),
            Some("token")
        );
    }
}
