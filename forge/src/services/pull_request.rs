//! Pull request engine
//!
//! Lifecycle state machine spanning up to two projects (fork and
//! upstream). Transitions are one-directional: Open -> Merged and
//! Open -> Closed, both terminal, committed through the store's
//! compare-and-set so a concurrent merge/close race has exactly one
//! winner.

use chrono::Utc;
use forge_core::access::{can_manage, can_view};
use forge_core::{
    AccessPolicy, ForgeError, ForgeId, GitGateway, Project, PullRequest, PullRequestStatus,
    Result, Role, User,
};
use forge_storage::ForgeStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Parameters for opening a pull request
#[derive(Debug, Clone)]
pub struct CreatePullRequest {
    pub title: String,
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub source_project_id: Option<ForgeId>,
}

/// Pull request lifecycle service
#[derive(Clone)]
pub struct PullRequestService {
    store: Arc<ForgeStore>,
    gateway: Arc<dyn GitGateway>,
    policy: AccessPolicy,
}

impl PullRequestService {
    pub fn new(store: Arc<ForgeStore>, gateway: Arc<dyn GitGateway>, policy: AccessPolicy) -> Self {
        Self {
            store,
            gateway,
            policy,
        }
    }

    /// Open a pull request against `target_id`.
    ///
    /// The actor must be able to see the target, and the source project
    /// when one is named. A cross-project PR is only accepted from a
    /// direct fork of the target; the store revalidates that linkage
    /// atomically at insert time.
    pub fn create(
        &self,
        actor: &User,
        target_id: ForgeId,
        request: CreatePullRequest,
    ) -> Result<PullRequest> {
        if request.title.trim().is_empty() {
            return Err(ForgeError::validation("pull request title must not be empty"));
        }
        if request.source_branch.trim().is_empty() || request.target_branch.trim().is_empty() {
            return Err(ForgeError::validation("source and target branches are required"));
        }

        let target = self.store.get_project(target_id)?;
        self.ensure_view(actor, &target)?;

        if let Some(source_id) = request.source_project_id {
            let source = self.store.get_project(source_id)?;
            self.ensure_view(actor, &source)?;
            if source.forked_from != Some(target_id) {
                return Err(ForgeError::invalid_state(
                    "source project is not a fork of the target project",
                ));
            }
        }

        let now = Utc::now();
        let pr = self.store.create_pull_request(PullRequest {
            id: ForgeId::new(),
            project_id: target_id,
            source_project_id: request.source_project_id,
            created_by: actor.id,
            title: request.title,
            description: request.description,
            source_branch: request.source_branch,
            target_branch: request.target_branch,
            status: PullRequestStatus::Open,
            created_at: now,
            updated_at: now,
        })?;

        info!(pr_id = %pr.id, target_id = %target_id, created_by = %actor.id, "Opened pull request");
        Ok(pr)
    }

    /// List pull requests targeting a project the actor can see.
    pub fn list(&self, actor: Option<&User>, target_id: ForgeId) -> Result<Vec<PullRequest>> {
        let target = self.store.get_project(target_id)?;
        let (user_id, role) = self.caller_context(actor, target_id);
        if !can_view(&target, user_id, role) {
            return Err(ForgeError::permission_denied(
                "you do not have access to this project",
            ));
        }
        Ok(self.store.list_pull_requests(target_id))
    }

    /// Merge an open pull request.
    ///
    /// The gateway applies the branch merge first; only its success
    /// advances the state machine. A gateway failure or timeout leaves
    /// the PR Open and is surfaced to the caller, who may retry safely.
    pub async fn merge(&self, actor: &User, target_id: ForgeId, pr_id: ForgeId) -> Result<PullRequest> {
        let target = self.store.get_project(target_id)?;
        let pr = self.store.get_pull_request(target_id, pr_id)?;

        self.ensure_manage(actor, &target)?;

        if !pr.is_open() {
            return Err(ForgeError::invalid_state(format!(
                "pull request is already {:?}",
                pr.status
            )));
        }

        let owner = self.store.get_user(target.owner_id)?;
        if let Err(e) = self
            .gateway
            .apply_merge(&target, &owner.username, &pr.source_branch, &pr.target_branch)
            .await
        {
            warn!(pr_id = %pr_id, error = %e, "Gateway merge failed; pull request stays open");
            return Err(e);
        }

        // the race against a concurrent close is decided here
        let merged = self
            .store
            .transition_pull_request(pr_id, PullRequestStatus::Merged)?;

        // fold the fork's snapshot into the target, matching the branch
        // merge the gateway just applied. The merge has already committed,
        // so a snapshot copy that loses to a concurrent delete is logged
        // rather than surfaced as a failure.
        if let Some(source_id) = pr.source_project_id {
            match self.store.get_project(source_id) {
                Ok(source) => {
                    if let Err(e) = self.store.save_code(target_id, source.code) {
                        warn!(pr_id = %pr_id, error = %e, "Snapshot copy after merge failed");
                    }
                }
                Err(e) => {
                    warn!(pr_id = %pr_id, source_id = %source_id, error = %e, "Fork gone before snapshot copy");
                }
            }
        }

        info!(pr_id = %pr_id, target_id = %target_id, "Merged pull request");
        Ok(merged)
    }

    /// Close an open pull request. Managers may close any PR; the author
    /// may always close their own.
    pub fn close(&self, actor: &User, target_id: ForgeId, pr_id: ForgeId) -> Result<PullRequest> {
        let target = self.store.get_project(target_id)?;
        let pr = self.store.get_pull_request(target_id, pr_id)?;

        let role = self.store.role_of(target_id, actor.id);
        let is_manager = can_manage(&target, Some(actor.id), role, self.policy);
        if !is_manager && pr.created_by != actor.id {
            return Err(ForgeError::permission_denied(
                "only the project owner or the author can close this pull request",
            ));
        }

        let closed = self
            .store
            .transition_pull_request(pr_id, PullRequestStatus::Closed)?;
        info!(pr_id = %pr_id, target_id = %target_id, "Closed pull request");
        Ok(closed)
    }

    fn ensure_view(&self, actor: &User, project: &Project) -> Result<()> {
        let role = self.store.role_of(project.id, actor.id);
        if !can_view(project, Some(actor.id), role) {
            return Err(ForgeError::permission_denied(
                "you do not have access to this project",
            ));
        }
        Ok(())
    }

    fn ensure_manage(&self, actor: &User, project: &Project) -> Result<()> {
        let role = self.store.role_of(project.id, actor.id);
        if !can_manage(project, Some(actor.id), role, self.policy) {
            return Err(ForgeError::permission_denied(
                "only the project owner can merge pull requests",
            ));
        }
        Ok(())
    }

    fn caller_context(
        &self,
        actor: Option<&User>,
        project_id: ForgeId,
    ) -> (Option<ForgeId>, Option<Role>) {
        match actor {
            Some(user) => (Some(user.id), self.store.role_of(project_id, user.id)),
            None => (None, None),
        }
    }
}
