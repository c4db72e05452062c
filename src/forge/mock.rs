//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge answers comparisons from a table of scripted statuses,
//! records every call, and can be told to fail. [`MockForgeFactory`] hands
//! out clones of one mock (clones share state) and records which
//! repositories were asked for.
//!
//! # Example
//!
//! ```
//! use gitpin::forge::mock::{FailOn, MockForge};
//! use gitpin::forge::{CompareStatus, Forge, ForgeError};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//! forge.set_status("v1.0.0", "abc123", CompareStatus::Behind);
//! assert_eq!(forge.compare("v1.0.0", "abc123").await.unwrap(), CompareStatus::Behind);
//!
//! // Unscripted pairs use the default status.
//! assert_eq!(forge.compare("v2.0.0", "abc123").await.unwrap(), CompareStatus::Ahead);
//!
//! forge.fail_on(FailOn::Compare(ForgeError::RateLimited));
//! assert!(forge.compare("v1.0.0", "abc123").await.is_err());
//! assert_eq!(forge.operations().len(), 3);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::factory::{ForgeFactory, RepoSource};
use super::traits::{CompareStatus, Forge, ForgeError};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Scripted statuses by `(base, head)`.
    statuses: HashMap<(String, String), CompareStatus>,
    /// Status for unscripted pairs.
    default_status: CompareStatus,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail compare with the given error.
    Compare(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Compare { base: String, head: String },
}

impl MockForge {
    /// Create a mock whose unscripted comparisons are `Ahead`.
    pub fn new() -> Self {
        Self::with_default(CompareStatus::Ahead)
    }

    /// Create a mock with a custom status for unscripted comparisons.
    pub fn with_default(default_status: CompareStatus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                statuses: HashMap::new(),
                default_status,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Script the status for one `(base, head)` pair.
    pub fn set_status(&self, base: &str, head: &str, status: CompareStatus) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .statuses
            .insert((base.to_string(), head.to_string()), status);
    }

    /// Configure a failure for the next operations.
    pub fn fail_on(&self, fail_on: FailOn) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = Some(fail_on);
    }

    /// Clear any configured failure.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareStatus, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Compare {
            base: base.to_string(),
            head: head.to_string(),
        });

        if let Some(FailOn::Compare(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        Ok(inner
            .statuses
            .get(&(base.to_string(), head.to_string()))
            .copied()
            .unwrap_or(inner.default_status))
    }
}

/// Factory that always returns (a clone of) one [`MockForge`].
#[derive(Debug, Clone, Default)]
pub struct MockForgeFactory {
    forge: MockForge,
    requested: Arc<Mutex<Vec<RepoSource>>>,
}

impl MockForgeFactory {
    pub fn new(forge: MockForge) -> Self {
        Self {
            forge,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Repositories a forge was requested for, in order.
    pub fn requested(&self) -> Vec<RepoSource> {
        self.requested.lock().unwrap().clone()
    }
}

impl ForgeFactory for MockForgeFactory {
    fn forge_for(&self, source: &RepoSource) -> Result<Box<dyn Forge>, ForgeError> {
        self.requested.lock().unwrap().push(source.clone());
        Ok(Box::new(self.forge.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::ForgeProvider;

    #[tokio::test]
    async fn scripted_and_default_statuses() {
        let forge = MockForge::with_default(CompareStatus::Unknown);
        forge.set_status("v1", "abc", CompareStatus::Identical);

        assert_eq!(
            forge.compare("v1", "abc").await.unwrap(),
            CompareStatus::Identical
        );
        assert_eq!(
            forge.compare("abc", "v1").await.unwrap(),
            CompareStatus::Unknown
        );
    }

    #[tokio::test]
    async fn records_operations() {
        let forge = MockForge::new();
        forge.compare("v1", "abc").await.unwrap();

        assert_eq!(
            forge.operations(),
            vec![MockOperation::Compare {
                base: "v1".into(),
                head: "abc".into()
            }]
        );
        forge.clear_operations();
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn fail_on_compare() {
        let forge = MockForge::new();
        forge.fail_on(FailOn::Compare(ForgeError::NotFound("repo".into())));
        assert_eq!(
            forge.compare("v1", "abc").await,
            Err(ForgeError::NotFound("repo".into()))
        );

        forge.clear_fail_on();
        assert!(forge.compare("v1", "abc").await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let forge = MockForge::new();
        let clone = forge.clone();
        clone.set_status("a", "b", CompareStatus::Behind);

        assert_eq!(forge.compare("a", "b").await.unwrap(), CompareStatus::Behind);
        assert_eq!(clone.operations().len(), 1);
    }

    #[tokio::test]
    async fn factory_records_requests() {
        let forge = MockForge::new();
        let factory = MockForgeFactory::new(forge.clone());
        let source = RepoSource::from_url("https://github.com/a/b").unwrap();

        let boxed = factory.forge_for(&source).unwrap();
        boxed.compare("v1", "abc").await.unwrap();

        assert_eq!(factory.requested()[0].provider, ForgeProvider::GitHub);
        assert_eq!(forge.operations().len(), 1);
    }
}
