//! Boundary traits consumed by the Forge services.

use crate::error::Result;
use crate::types::{BranchInfo, GitCredentials, Project};
use async_trait::async_trait;

/// Contract for the version-control synchronization boundary.
///
/// Every operation is fallible and must be treated as all-or-nothing by
/// callers: a failure (including a timeout) means no domain state may be
/// advanced on its account. Credentials are passed through per call and
/// never persisted or logged by implementations.
#[async_trait]
pub trait GitGateway: Send + Sync {
    /// Clone a remote into the project's checkout, or attach to an
    /// existing checkout. Idempotent: cloning an already-cloned project
    /// succeeds.
    async fn clone_repo(
        &self,
        project: &Project,
        owner_username: &str,
        remote_url: &str,
        branch: Option<&str>,
        auth: Option<&GitCredentials>,
    ) -> Result<String>;

    /// List branches in the project's checkout. An uncloned project has
    /// no branches.
    async fn list_branches(&self, project: &Project, owner_username: &str)
        -> Result<Vec<BranchInfo>>;

    /// Create a branch in the project's checkout.
    async fn create_branch(&self, project: &Project, owner_username: &str, name: &str)
        -> Result<()>;

    /// Pull the given branch (or the current one) from origin.
    async fn pull(
        &self,
        project: &Project,
        owner_username: &str,
        branch: Option<&str>,
        auth: Option<&GitCredentials>,
    ) -> Result<()>;

    /// Push the given branch (or the current one) to origin.
    async fn push(
        &self,
        project: &Project,
        owner_username: &str,
        branch: Option<&str>,
        auth: Option<&GitCredentials>,
    ) -> Result<()>;

    /// Apply `source_branch` into `target_branch` in the project's
    /// checkout. Success means the merge is fully applied; failure means
    /// nothing was applied.
    async fn apply_merge(
        &self,
        project: &Project,
        owner_username: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<()>;
}
