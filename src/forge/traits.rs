//! forge::traits
//!
//! Forge trait definition for comparing commits on a hosting service.
//!
//! # Design
//!
//! Pin resolution needs exactly one thing from a forge: how a commit relates
//! to a release tag. Each implementation maps its host's API onto
//! [`CompareStatus`]; hosts without a usable API answer
//! [`CompareStatus::Unknown`] instead of failing.
//!
//! # Example
//!
//! ```
//! use gitpin::forge::mock::MockForge;
//! use gitpin::forge::{CompareStatus, Forge};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//! forge.set_status("v2.0.0", "main", CompareStatus::Behind);
//!
//! let status = forge.compare("v2.0.0", "main").await.unwrap();
//! assert_eq!(status, CompareStatus::Behind);
//! # });
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from forge operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The repository or one of the refs was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ForgeError {
    /// Map a non-success HTTP status onto an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ForgeError::AuthFailed(message),
            403 if message.to_lowercase().contains("rate limit") => ForgeError::RateLimited,
            403 => ForgeError::AuthFailed(message),
            404 => ForgeError::NotFound(message),
            429 => ForgeError::RateLimited,
            _ => ForgeError::ApiError { status, message },
        }
    }

    /// Whether the error means "the refs cannot be compared" rather than
    /// "the forge could not be asked".
    pub fn is_permanent(&self) -> bool {
        matches!(self, ForgeError::NotFound(_) | ForgeError::ApiError { .. })
    }
}

/// How `head` relates to `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareStatus {
    /// `head` has commits `base` lacks.
    Ahead,
    /// Every commit in `head` is already in `base`.
    Behind,
    /// Same commit.
    Identical,
    Diverged,
    /// The host cannot answer.
    Unknown,
}

impl CompareStatus {
    /// Parse the `status` field of a GitHub comparison.
    pub fn parse(s: &str) -> Self {
        match s {
            "ahead" => CompareStatus::Ahead,
            "behind" => CompareStatus::Behind,
            "identical" => CompareStatus::Identical,
            "diverged" => CompareStatus::Diverged,
            _ => CompareStatus::Unknown,
        }
    }

    /// Whether `head` is contained in `base`.
    ///
    /// `Identical` counts only when `allow_identical` is set.
    pub fn is_included(&self, allow_identical: bool) -> bool {
        match self {
            CompareStatus::Behind => true,
            CompareStatus::Identical => allow_identical,
            _ => false,
        }
    }
}

impl std::fmt::Display for CompareStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareStatus::Ahead => write!(f, "ahead"),
            CompareStatus::Behind => write!(f, "behind"),
            CompareStatus::Identical => write!(f, "identical"),
            CompareStatus::Diverged => write!(f, "diverged"),
            CompareStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Compare capability of a hosting service, bound to one repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// - `NotFound` / `ApiError`: the comparison does not exist
/// - `AuthFailed` / `RateLimited` / `NetworkError`: the host could not be asked
#[async_trait]
pub trait Forge: Send + Sync {
    /// Provider name, e.g. `"github"`.
    fn name(&self) -> &'static str;

    /// Compare `head` against `base`.
    async fn compare(&self, base: &str, head: &str) -> Result<CompareStatus, ForgeError>;
}
