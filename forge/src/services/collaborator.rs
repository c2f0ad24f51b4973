//! Collaborator registry
//!
//! Per-project role assignments. All operations are manage-gated; in this
//! design even listing the team is owner-only, stricter than viewing the
//! project itself.

use forge_core::access::can_manage;
use forge_core::{AccessPolicy, Collaborator, ForgeError, ForgeId, Result, Role, User};
use forge_storage::ForgeStore;
use std::sync::Arc;
use tracing::info;

/// Collaborator registry service
#[derive(Clone)]
pub struct CollaboratorService {
    store: Arc<ForgeStore>,
    policy: AccessPolicy,
}

impl CollaboratorService {
    pub fn new(store: Arc<ForgeStore>, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Add a collaborator by username. The Owner role is never assignable.
    pub fn add_collaborator(
        &self,
        actor: &User,
        project_id: ForgeId,
        username: &str,
        role: Role,
    ) -> Result<Collaborator> {
        self.ensure_manage(actor, project_id)?;

        if !role.is_assignable() {
            return Err(ForgeError::validation(
                "role must be one of maintainer, contributor, viewer",
            ));
        }

        let user = self
            .store
            .find_user_by_username(username)
            .ok_or_else(|| ForgeError::not_found("user", username))?;

        let collaborator = self
            .store
            .add_collaborator(Collaborator::new(project_id, user.id, role))?;

        info!(
            project_id = %project_id,
            user_id = %user.id,
            role = ?role,
            "Added collaborator"
        );
        Ok(collaborator)
    }

    /// Remove a collaborator row. The Owner entry is protected by the store.
    pub fn remove_collaborator(
        &self,
        actor: &User,
        project_id: ForgeId,
        collaborator_id: ForgeId,
    ) -> Result<()> {
        self.ensure_manage(actor, project_id)?;

        let collaborator = self.store.get_collaborator(collaborator_id)?;
        if collaborator.project_id != project_id {
            return Err(ForgeError::not_found("collaborator", collaborator_id));
        }

        self.store.remove_collaborator(collaborator_id)?;
        info!(project_id = %project_id, collaborator_id = %collaborator_id, "Removed collaborator");
        Ok(())
    }

    /// List the project's collaborators, including the seeded Owner row.
    pub fn list_collaborators(&self, actor: &User, project_id: ForgeId) -> Result<Vec<Collaborator>> {
        self.ensure_manage(actor, project_id)?;
        Ok(self.store.list_collaborators(project_id))
    }

    fn ensure_manage(&self, actor: &User, project_id: ForgeId) -> Result<()> {
        let project = self.store.get_project(project_id)?;
        let role = self.store.role_of(project_id, actor.id);
        if !can_manage(&project, Some(actor.id), role, self.policy) {
            return Err(ForgeError::permission_denied(
                "only the project owner can manage collaborators",
            ));
        }
        Ok(())
    }
}
