//! Project service
//!
//! Owns project records: creation, visibility toggling, forking, code
//! snapshots, and public discovery.

use forge_core::access::{can_edit, can_view};
use forge_core::{access, AccessPolicy, ForgeError, ForgeId, Project, Result, User, Visibility};
use forge_storage::ForgeStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Project service for managing projects and forks
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<ForgeStore>,
    policy: AccessPolicy,
}

impl ProjectService {
    pub fn new(store: Arc<ForgeStore>, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Create a new project owned by `actor`. The Owner collaborator row
    /// is seeded by the store in the same transaction.
    pub fn create_project(
        &self,
        actor: &User,
        name: String,
        description: String,
        visibility: Visibility,
    ) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(ForgeError::validation("project name must not be empty"));
        }

        let project = self
            .store
            .create_project(Project::new(name, description, actor.id, visibility))?;

        info!(project_id = %project.id, owner_id = %actor.id, "Created project");
        Ok(project)
    }

    /// Get a project, enforcing visibility. Anonymous callers (no actor)
    /// may only see public projects.
    pub fn get_project(&self, actor: Option<&User>, project_id: ForgeId) -> Result<Project> {
        let project = self.store.get_project(project_id)?;
        let (user_id, role) = self.caller_context(actor, project_id);
        if !can_view(&project, user_id, role) {
            return Err(ForgeError::permission_denied(
                "you do not have access to this project",
            ));
        }
        Ok(project)
    }

    /// List projects owned by the actor
    pub fn list_projects(&self, actor: &User) -> Vec<Project> {
        self.store.list_projects_by_owner(actor.id)
    }

    /// Update project name and description
    pub fn update_project(
        &self,
        actor: &User,
        project_id: ForgeId,
        name: String,
        description: String,
    ) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(ForgeError::validation("project name must not be empty"));
        }
        let project = self.store.get_project(project_id)?;
        let (user_id, role) = self.caller_context(Some(actor), project_id);
        if !can_edit(&project, user_id, role) {
            return Err(ForgeError::permission_denied(
                "you do not have write access to this project",
            ));
        }
        self.store.update_project(project_id, name, description)
    }

    /// Delete a project and everything it owns. Owner only.
    pub fn delete_project(&self, actor: &User, project_id: ForgeId) -> Result<()> {
        let project = self.store.get_project(project_id)?;
        if project.owner_id != actor.id {
            return Err(ForgeError::permission_denied(
                "only the owner can delete a project",
            ));
        }
        self.store.delete_project(project_id)?;
        info!(project_id = %project_id, "Deleted project");
        Ok(())
    }

    /// Toggle project visibility. Owner only; idempotent when unchanged.
    pub fn set_visibility(
        &self,
        actor: &User,
        project_id: ForgeId,
        visibility: Visibility,
    ) -> Result<Project> {
        let project = self.store.get_project(project_id)?;
        if project.owner_id != actor.id {
            return Err(ForgeError::permission_denied(
                "only the owner can change project visibility",
            ));
        }
        let updated = self.store.set_visibility(project_id, visibility)?;
        debug!(project_id = %project_id, visibility = ?visibility, "Visibility set");
        Ok(updated)
    }

    /// Fork a visible project into the actor's workspace.
    ///
    /// The fork copies name, description and the code snapshot, is owned
    /// by the actor, starts Private regardless of the source visibility,
    /// and records the immediate parent in `forked_from`. Forking a fork
    /// is allowed; chains are unbounded. If the source disappears before
    /// the fork commits, the store reports NotFound.
    pub fn fork_project(&self, actor: &User, source_id: ForgeId) -> Result<Project> {
        let source = self.store.get_project(source_id)?;
        let (user_id, role) = self.caller_context(Some(actor), source_id);
        if !can_view(&source, user_id, role) {
            return Err(ForgeError::permission_denied(
                "you do not have access to this project",
            ));
        }

        let mut fork = Project::new(
            format!("{} (fork)", source.name),
            source.description.clone(),
            actor.id,
            Visibility::Private,
        );
        fork.forked_from = Some(source.id);
        fork.code = source.code;

        let fork = self.store.create_project(fork)?;
        info!(fork_id = %fork.id, source_id = %source_id, owner_id = %actor.id, "Forked project");
        Ok(fork)
    }

    /// Save the project's code snapshot. Requires write access.
    pub fn save_code(&self, actor: &User, project_id: ForgeId, code: String) -> Result<Project> {
        let project = self.store.get_project(project_id)?;
        let (user_id, role) = self.caller_context(Some(actor), project_id);
        if !can_edit(&project, user_id, role) {
            return Err(ForgeError::permission_denied(
                "you do not have write access to this project",
            ));
        }
        self.store.save_code(project_id, code)
    }

    /// Read the project's code snapshot. Requires view access.
    pub fn get_code(&self, actor: Option<&User>, project_id: ForgeId) -> Result<String> {
        Ok(self.get_project(actor, project_id)?.code)
    }

    /// List all public projects (no authentication required)
    pub fn list_public_projects(&self) -> Vec<Project> {
        self.store.list_public_projects()
    }

    /// Get a single public project (no authentication required)
    pub fn get_public_project(&self, project_id: ForgeId) -> Result<Project> {
        let project = self.store.get_project(project_id)?;
        if !project.is_public() {
            return Err(ForgeError::not_found("project", project_id));
        }
        Ok(project)
    }

    /// Whether the actor may manage the project, under the configured policy
    pub fn can_manage(&self, actor: &User, project: &Project) -> bool {
        let role = self.store.role_of(project.id, actor.id);
        access::can_manage(project, Some(actor.id), role, self.policy)
    }

    fn caller_context(
        &self,
        actor: Option<&User>,
        project_id: ForgeId,
    ) -> (Option<ForgeId>, Option<forge_core::Role>) {
        match actor {
            Some(user) => (Some(user.id), self.store.role_of(project_id, user.id)),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{Collaborator, Role};

    fn setup() -> (Arc<ForgeStore>, ProjectService, User, User) {
        let store = Arc::new(ForgeStore::new());
        let service = ProjectService::new(store.clone(), AccessPolicy::default());
        let owner = store
            .create_user(User::new("owner".to_string(), "hash".to_string()))
            .unwrap();
        let other = store
            .create_user(User::new("other".to_string(), "hash".to_string()))
            .unwrap();
        (store, service, owner, other)
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_, service, owner, _) = setup();
        let err = service
            .create_project(&owner, "  ".to_string(), String::new(), Visibility::Private)
            .unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
    }

    #[test]
    fn test_non_owner_cannot_toggle_visibility() {
        let (_, service, owner, other) = setup();
        let project = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Private)
            .unwrap();
        let err = service
            .set_visibility(&other, project.id, Visibility::Public)
            .unwrap_err();
        assert!(err.is_permission_denied());
        // visibility unchanged
        let current = service.get_project(Some(&owner), project.id).unwrap();
        assert_eq!(current.visibility, Visibility::Private);
    }

    #[test]
    fn test_private_project_hidden_from_anonymous() {
        let (_, service, owner, _) = setup();
        let project = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Private)
            .unwrap();
        let err = service.get_project(None, project.id).unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_fork_of_public_project() {
        let (_, service, owner, other) = setup();
        let source = service
            .create_project(&owner, "alpha".to_string(), "demo".to_string(), Visibility::Public)
            .unwrap();
        service.save_code(&owner, source.id, "fn main() {}".to_string()).unwrap();

        let fork = service.fork_project(&other, source.id).unwrap();
        assert_eq!(fork.forked_from, Some(source.id));
        assert_eq!(fork.owner_id, other.id);
        assert_eq!(fork.visibility, Visibility::Private);
        assert_eq!(fork.name, "alpha (fork)");
        assert_eq!(fork.code, "fn main() {}");
    }

    #[test]
    fn test_private_project_not_forkable_by_stranger() {
        let (_, service, owner, other) = setup();
        let source = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Private)
            .unwrap();
        let err = service.fork_project(&other, source.id).unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_double_fork_yields_distinct_projects() {
        let (_, service, owner, other) = setup();
        let source = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Public)
            .unwrap();
        let fork1 = service.fork_project(&other, source.id).unwrap();
        let fork2 = service.fork_project(&other, source.id).unwrap();
        assert_ne!(fork1.id, fork2.id);
        assert_eq!(fork1.forked_from, Some(source.id));
        assert_eq!(fork2.forked_from, Some(source.id));
    }

    #[test]
    fn test_fork_of_fork_points_at_immediate_parent() {
        let (_, service, owner, other) = setup();
        let root = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Public)
            .unwrap();
        let fork = service.fork_project(&other, root.id).unwrap();
        // fork owner can always see their own private fork
        let fork_of_fork = service.fork_project(&other, fork.id).unwrap();
        assert_eq!(fork_of_fork.forked_from, Some(fork.id));
    }

    #[test]
    fn test_viewer_cannot_save_code() {
        let (store, service, owner, other) = setup();
        let project = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Private)
            .unwrap();
        store
            .add_collaborator(Collaborator::new(project.id, other.id, Role::Viewer))
            .unwrap();
        // a viewer can see the project
        assert!(service.get_project(Some(&other), project.id).is_ok());
        // but never write to it
        let err = service
            .save_code(&other, project.id, "x".to_string())
            .unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_contributor_can_edit_but_not_delete() {
        let (store, service, owner, other) = setup();
        let project = service
            .create_project(&owner, "alpha".to_string(), String::new(), Visibility::Private)
            .unwrap();
        store
            .add_collaborator(Collaborator::new(project.id, other.id, Role::Contributor))
            .unwrap();

        let updated = service
            .save_code(&other, project.id, "contributed".to_string())
            .unwrap();
        assert_eq!(updated.code, "contributed");

        let err = service.delete_project(&other, project.id).unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_public_listing_excludes_private() {
        let (_, service, owner, _) = setup();
        service
            .create_project(&owner, "pub".to_string(), String::new(), Visibility::Public)
            .unwrap();
        service
            .create_project(&owner, "priv".to_string(), String::new(), Visibility::Private)
            .unwrap();
        let listed = service.list_public_projects();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "pub");

        let private = service
            .create_project(&owner, "p2".to_string(), String::new(), Visibility::Private)
            .unwrap();
        assert!(service.get_public_project(private.id).unwrap_err().is_not_found());
    }
}
