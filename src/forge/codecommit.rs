//! forge::codecommit
//!
//! AWS CodeCommit placeholder. CodeCommit has no comparison API gitpin can
//! use, so every comparison is [`CompareStatus::Unknown`].

use async_trait::async_trait;

use super::traits::{CompareStatus, Forge, ForgeError};

#[derive(Debug, Clone)]
pub struct CodeCommitForge {
    repo: String,
}

impl CodeCommitForge {
    pub fn new(repo: impl Into<String>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

#[async_trait]
impl Forge for CodeCommitForge {
    fn name(&self) -> &'static str {
        "codecommit"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareStatus, ForgeError> {
        tracing::debug!(repo = %self.repo, base, head, "codecommit cannot compare commits");
        Ok(CompareStatus::Unknown)
    }
}
