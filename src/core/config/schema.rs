//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! [checker]
//! ignored_versions = [">= 2.0.0"]
//! raise_on_ignored = false
//! consider_version_branches_pinned = false
//!
//! [transport]
//! connect_timeout_secs = 5
//! read_timeout_secs = 20
//! ls_remote_timeout_secs = 120
//! user_agent = "gitpin"
//!
//! [forges]
//! github_api = "https://api.github.com"
//! gitlab_api = "https://gitlab.com/api/v4"
//! bitbucket_api = "https://api.bitbucket.org/2.0"
//!
//! [[credentials]]
//! type = "git_source"
//! host = "github.com"
//! username = "x-access-token"
//! password = "ghp_..."
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: timeouts must be non-zero and API
//! bases must be absolute URLs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::credentials::Credentials;

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Pin resolution policy.
    pub checker: CheckerSettings,

    /// Ref advertisement transport settings.
    pub transport: TransportSettings,

    /// Compare API endpoints.
    pub forges: ForgeSettings,

    /// Credentials for git hosts and forge APIs.
    pub credentials: Credentials,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transport.validate()?;
        self.forges.validate()?;
        Ok(())
    }
}

/// Pin resolution policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerSettings {
    /// Requirement strings; tags whose version satisfies any are skipped.
    pub ignored_versions: Vec<String>,

    /// Report "all versions ignored" instead of "no update".
    pub raise_on_ignored: bool,

    /// Treat a ref that names a version-shaped branch as pinned.
    pub consider_version_branches_pinned: bool,
}

/// Transport settings for ref discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSettings {
    pub connect_timeout_secs: u64,

    /// Many git hosts are slow to return a large tag list.
    pub read_timeout_secs: u64,

    /// Upper bound for the `git ls-remote` fallback.
    pub ls_remote_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            read_timeout_secs: 20,
            ls_remote_timeout_secs: 120,
            user_agent: concat!("gitpin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn ls_remote_timeout(&self) -> Duration {
        Duration::from_secs(self.ls_remote_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("transport.connect_timeout_secs", self.connect_timeout_secs),
            ("transport.read_timeout_secs", self.read_timeout_secs),
            ("transport.ls_remote_timeout_secs", self.ls_remote_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "transport.user_agent cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// API bases for the compare clients (override for self-hosted installs).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeSettings {
    pub github_api: String,
    pub gitlab_api: String,
    pub bitbucket_api: String,
}

impl Default for ForgeSettings {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            gitlab_api: "https://gitlab.com/api/v4".to_string(),
            bitbucket_api: "https://api.bitbucket.org/2.0".to_string(),
        }
    }
}

impl ForgeSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("forges.github_api", &self.github_api),
            ("forges.gitlab_api", &self.gitlab_api),
            ("forges.bitbucket_api", &self.bitbucket_api),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be an absolute URL, got '{}'",
                    key, value
                )));
            }
        }
        Ok(())
    }
}
