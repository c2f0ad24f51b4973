//! In-memory entity store.
//!
//! All mutations run as a single check-and-update inside the write lock,
//! so lifecycle preconditions (an open pull request, an existing fork
//! parent, a unique collaborator pair) are validated against current state
//! in the same critical section that commits the write. The lock is never
//! held across an await point. Reads are snapshot reads.

use chrono::Utc;
use forge_core::{
    Collaborator, ForgeError, ForgeId, Project, PullRequest, PullRequestStatus, Result, Role,
    User, Visibility,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Default)]
struct StoreInner {
    users: HashMap<ForgeId, User>,
    users_by_name: HashMap<String, ForgeId>,

    projects: HashMap<ForgeId, Project>,
    projects_by_owner: HashMap<ForgeId, HashSet<ForgeId>>,

    collaborators: HashMap<ForgeId, Collaborator>,
    collaborators_by_project: HashMap<ForgeId, HashSet<ForgeId>>,
    collaborator_by_pair: HashMap<(ForgeId, ForgeId), ForgeId>,

    pull_requests: HashMap<ForgeId, PullRequest>,
    pull_requests_by_project: HashMap<ForgeId, HashSet<ForgeId>>,
}

/// The authoritative store for all Forge entities.
#[derive(Default)]
pub struct ForgeStore {
    inner: RwLock<StoreInner>,
}

/// Entity counts, reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub users: usize,
    pub projects: usize,
    pub pull_requests: usize,
}

impl ForgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a new user. Fails with Conflict when the username is taken.
    pub fn create_user(&self, user: User) -> Result<User> {
        let mut inner = self.inner.write();
        if inner.users_by_name.contains_key(&user.username) {
            return Err(ForgeError::conflict(format!(
                "username '{}' already taken",
                user.username
            )));
        }
        inner.users_by_name.insert(user.username.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        debug!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    pub fn get_user(&self, id: ForgeId) -> Result<User> {
        self.inner
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| ForgeError::not_found("user", id))
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.read();
        inner
            .users_by_name
            .get(username)
            .and_then(|id| inner.users.get(id))
            .cloned()
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            users: inner.users.len(),
            projects: inner.projects.len(),
            pull_requests: inner.pull_requests.len(),
        }
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Insert a new project and seed its Owner collaborator row in the same
    /// critical section, so no observer ever sees a project without exactly
    /// one Owner entry.
    ///
    /// When `forked_from` is set it is validated here, atomically: the
    /// parent must still exist (a concurrently deleted source fails the
    /// fork with NotFound) and must not be the project itself.
    pub fn create_project(&self, project: Project) -> Result<Project> {
        let mut inner = self.inner.write();

        if let Some(parent_id) = project.forked_from {
            if parent_id == project.id {
                return Err(ForgeError::validation("a project cannot fork itself"));
            }
            if !inner.projects.contains_key(&parent_id) {
                return Err(ForgeError::not_found("project", parent_id));
            }
        }

        let owner_entry = Collaborator::new(project.id, project.owner_id, Role::Owner);
        inner
            .collaborators_by_project
            .entry(project.id)
            .or_default()
            .insert(owner_entry.id);
        inner
            .collaborator_by_pair
            .insert((project.id, project.owner_id), owner_entry.id);
        inner.collaborators.insert(owner_entry.id, owner_entry);

        inner
            .projects_by_owner
            .entry(project.owner_id)
            .or_default()
            .insert(project.id);
        inner.projects.insert(project.id, project.clone());

        debug!(project_id = %project.id, owner_id = %project.owner_id, "Created project");
        Ok(project)
    }

    pub fn get_project(&self, id: ForgeId) -> Result<Project> {
        self.inner
            .read()
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| ForgeError::not_found("project", id))
    }

    pub fn list_projects_by_owner(&self, owner_id: ForgeId) -> Vec<Project> {
        let inner = self.inner.read();
        let mut projects: Vec<Project> = inner
            .projects_by_owner
            .get(&owner_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.projects.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    pub fn list_public_projects(&self) -> Vec<Project> {
        let inner = self.inner.read();
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.is_public())
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    /// Update project visibility. Idempotent: setting the current value
    /// leaves `updated_at` untouched.
    pub fn set_visibility(&self, id: ForgeId, visibility: Visibility) -> Result<Project> {
        let mut inner = self.inner.write();
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or_else(|| ForgeError::not_found("project", id))?;
        if project.visibility != visibility {
            project.visibility = visibility;
            project.updated_at = Utc::now();
        }
        Ok(project.clone())
    }

    pub fn update_project(&self, id: ForgeId, name: String, description: String) -> Result<Project> {
        let mut inner = self.inner.write();
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or_else(|| ForgeError::not_found("project", id))?;
        project.name = name;
        project.description = description;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    pub fn save_code(&self, id: ForgeId, code: String) -> Result<Project> {
        let mut inner = self.inner.write();
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or_else(|| ForgeError::not_found("project", id))?;
        project.code = code;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    /// Delete a project together with its collaborator rows and its
    /// target-side pull requests. Forks of the project are left alone;
    /// their `forked_from` becomes a dangling weak reference, which only
    /// blocks creating new PRs from them.
    pub fn delete_project(&self, id: ForgeId) -> Result<()> {
        let mut inner = self.inner.write();
        let project = inner
            .projects
            .remove(&id)
            .ok_or_else(|| ForgeError::not_found("project", id))?;

        if let Some(owned) = inner.projects_by_owner.get_mut(&project.owner_id) {
            owned.remove(&id);
        }
        if let Some(collab_ids) = inner.collaborators_by_project.remove(&id) {
            for cid in collab_ids {
                if let Some(c) = inner.collaborators.remove(&cid) {
                    inner.collaborator_by_pair.remove(&(c.project_id, c.user_id));
                }
            }
        }
        if let Some(pr_ids) = inner.pull_requests_by_project.remove(&id) {
            for pr_id in pr_ids {
                inner.pull_requests.remove(&pr_id);
            }
        }

        debug!(project_id = %id, "Deleted project");
        Ok(())
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Add a collaborator row. The (project, user) pair is unique; the
    /// Owner role is seeded at project creation and rejected here.
    pub fn add_collaborator(&self, collaborator: Collaborator) -> Result<Collaborator> {
        let mut inner = self.inner.write();
        if !inner.projects.contains_key(&collaborator.project_id) {
            return Err(ForgeError::not_found("project", collaborator.project_id));
        }
        if !collaborator.role.is_assignable() {
            return Err(ForgeError::validation("the Owner role cannot be assigned"));
        }
        let pair = (collaborator.project_id, collaborator.user_id);
        if inner.collaborator_by_pair.contains_key(&pair) {
            return Err(ForgeError::conflict("user is already a collaborator"));
        }
        inner
            .collaborators_by_project
            .entry(collaborator.project_id)
            .or_default()
            .insert(collaborator.id);
        inner.collaborator_by_pair.insert(pair, collaborator.id);
        inner.collaborators.insert(collaborator.id, collaborator.clone());
        Ok(collaborator)
    }

    pub fn get_collaborator(&self, id: ForgeId) -> Result<Collaborator> {
        self.inner
            .read()
            .collaborators
            .get(&id)
            .cloned()
            .ok_or_else(|| ForgeError::not_found("collaborator", id))
    }

    /// Remove a collaborator row. The Owner entry can never be removed
    /// through this path, regardless of actor.
    pub fn remove_collaborator(&self, id: ForgeId) -> Result<()> {
        let mut inner = self.inner.write();
        let role = inner
            .collaborators
            .get(&id)
            .map(|c| c.role)
            .ok_or_else(|| ForgeError::not_found("collaborator", id))?;
        if role == Role::Owner {
            return Err(ForgeError::invalid_state(
                "the owner entry cannot be removed",
            ));
        }
        if let Some(collaborator) = inner.collaborators.remove(&id) {
            if let Some(set) = inner.collaborators_by_project.get_mut(&collaborator.project_id) {
                set.remove(&id);
            }
            inner
                .collaborator_by_pair
                .remove(&(collaborator.project_id, collaborator.user_id));
        }
        Ok(())
    }

    pub fn list_collaborators(&self, project_id: ForgeId) -> Vec<Collaborator> {
        let inner = self.inner.read();
        let mut collaborators: Vec<Collaborator> = inner
            .collaborators_by_project
            .get(&project_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.collaborators.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        collaborators.sort_by_key(|c| c.created_at);
        collaborators
    }

    /// Role of a user on a project, if any. Constant-time via the pair index.
    pub fn role_of(&self, project_id: ForgeId, user_id: ForgeId) -> Option<Role> {
        let inner = self.inner.read();
        inner
            .collaborator_by_pair
            .get(&(project_id, user_id))
            .and_then(|id| inner.collaborators.get(id))
            .map(|c| c.role)
    }

    // ========================================================================
    // Pull requests
    // ========================================================================

    /// Insert a new pull request, revalidating the fork linkage against
    /// current state in the same critical section.
    pub fn create_pull_request(&self, pr: PullRequest) -> Result<PullRequest> {
        let mut inner = self.inner.write();
        if !inner.projects.contains_key(&pr.project_id) {
            return Err(ForgeError::not_found("project", pr.project_id));
        }
        if let Some(source_id) = pr.source_project_id {
            if source_id == pr.project_id {
                return Err(ForgeError::invalid_state(
                    "source project must differ from the target project",
                ));
            }
            let source = inner
                .projects
                .get(&source_id)
                .ok_or_else(|| ForgeError::not_found("project", source_id))?;
            if source.forked_from != Some(pr.project_id) {
                return Err(ForgeError::invalid_state(
                    "source project is not a fork of the target project",
                ));
            }
        }
        inner
            .pull_requests_by_project
            .entry(pr.project_id)
            .or_default()
            .insert(pr.id);
        inner.pull_requests.insert(pr.id, pr.clone());
        debug!(pr_id = %pr.id, project_id = %pr.project_id, "Created pull request");
        Ok(pr)
    }

    /// Fetch a pull request scoped to its target project.
    pub fn get_pull_request(&self, project_id: ForgeId, pr_id: ForgeId) -> Result<PullRequest> {
        let inner = self.inner.read();
        inner
            .pull_requests
            .get(&pr_id)
            .filter(|pr| pr.project_id == project_id)
            .cloned()
            .ok_or_else(|| ForgeError::not_found("pull_request", pr_id))
    }

    pub fn list_pull_requests(&self, project_id: ForgeId) -> Vec<PullRequest> {
        let inner = self.inner.read();
        let mut prs: Vec<PullRequest> = inner
            .pull_requests_by_project
            .get(&project_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.pull_requests.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        prs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        prs
    }

    /// Compare-and-set the pull request status. The transition commits
    /// only when the PR is still Open; a concurrent merge/close race is
    /// decided here, and the loser observes InvalidState.
    pub fn transition_pull_request(
        &self,
        pr_id: ForgeId,
        to: PullRequestStatus,
    ) -> Result<PullRequest> {
        debug_assert!(to.is_terminal());
        let mut inner = self.inner.write();
        let pr = inner
            .pull_requests
            .get_mut(&pr_id)
            .ok_or_else(|| ForgeError::not_found("pull_request", pr_id))?;
        if !pr.is_open() {
            return Err(ForgeError::invalid_state(format!(
                "pull request is already {:?}",
                pr.status
            )));
        }
        pr.status = to;
        pr.updated_at = Utc::now();
        Ok(pr.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_owner() -> (ForgeStore, User) {
        let store = ForgeStore::new();
        let owner = store
            .create_user(User::new("owner".to_string(), "hash".to_string()))
            .unwrap();
        (store, owner)
    }

    fn new_project(owner: &User, visibility: Visibility) -> Project {
        Project::new("alpha".to_string(), "demo".to_string(), owner.id, visibility)
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (store, _) = store_with_owner();
        let err = store
            .create_user(User::new("owner".to_string(), "other".to_string()))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_create_project_seeds_exactly_one_owner_row() {
        let (store, owner) = store_with_owner();
        let project = store
            .create_project(new_project(&owner, Visibility::Private))
            .unwrap();
        let collaborators = store.list_collaborators(project.id);
        let owners: Vec<_> = collaborators
            .iter()
            .filter(|c| c.role == Role::Owner)
            .collect();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].user_id, project.owner_id);
    }

    #[test]
    fn test_owner_row_cannot_be_removed() {
        let (store, owner) = store_with_owner();
        let project = store
            .create_project(new_project(&owner, Visibility::Private))
            .unwrap();
        let owner_row = store
            .list_collaborators(project.id)
            .into_iter()
            .find(|c| c.role == Role::Owner)
            .unwrap();
        let err = store.remove_collaborator(owner_row.id).unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(store.list_collaborators(project.id).len(), 1);
    }

    #[test]
    fn test_duplicate_collaborator_pair_conflicts() {
        let (store, owner) = store_with_owner();
        let member = store
            .create_user(User::new("bob".to_string(), "hash".to_string()))
            .unwrap();
        let project = store
            .create_project(new_project(&owner, Visibility::Private))
            .unwrap();
        store
            .add_collaborator(Collaborator::new(project.id, member.id, Role::Contributor))
            .unwrap();
        let err = store
            .add_collaborator(Collaborator::new(project.id, member.id, Role::Viewer))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_owner_role_not_assignable() {
        let (store, owner) = store_with_owner();
        let member = store
            .create_user(User::new("bob".to_string(), "hash".to_string()))
            .unwrap();
        let project = store
            .create_project(new_project(&owner, Visibility::Private))
            .unwrap();
        let err = store
            .add_collaborator(Collaborator::new(project.id, member.id, Role::Owner))
            .unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
    }

    #[test]
    fn test_fork_parent_must_exist() {
        let (store, owner) = store_with_owner();
        let mut fork = new_project(&owner, Visibility::Private);
        fork.forked_from = Some(ForgeId::new());
        let err = store.create_project(fork).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_no_self_fork() {
        let (store, owner) = store_with_owner();
        let mut project = new_project(&owner, Visibility::Private);
        project.forked_from = Some(project.id);
        let err = store.create_project(project).unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
    }

    #[test]
    fn test_set_visibility_is_idempotent() {
        let (store, owner) = store_with_owner();
        let project = store
            .create_project(new_project(&owner, Visibility::Private))
            .unwrap();
        let first = store.set_visibility(project.id, Visibility::Public).unwrap();
        let second = store.set_visibility(project.id, Visibility::Public).unwrap();
        assert_eq!(first.updated_at, second.updated_at);
        assert_eq!(second.visibility, Visibility::Public);
    }

    #[test]
    fn test_delete_project_cascades() {
        let (store, owner) = store_with_owner();
        let member = store
            .create_user(User::new("bob".to_string(), "hash".to_string()))
            .unwrap();
        let project = store
            .create_project(new_project(&owner, Visibility::Public))
            .unwrap();
        store
            .add_collaborator(Collaborator::new(project.id, member.id, Role::Viewer))
            .unwrap();
        let pr = PullRequest {
            id: ForgeId::new(),
            project_id: project.id,
            source_project_id: None,
            created_by: owner.id,
            title: "t".to_string(),
            description: String::new(),
            source_branch: "feature".to_string(),
            target_branch: "main".to_string(),
            status: PullRequestStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let pr = store.create_pull_request(pr).unwrap();

        store.delete_project(project.id).unwrap();

        assert!(store.get_project(project.id).unwrap_err().is_not_found());
        assert!(store.list_collaborators(project.id).is_empty());
        assert!(store
            .get_pull_request(project.id, pr.id)
            .unwrap_err()
            .is_not_found());
        assert!(store.role_of(project.id, member.id).is_none());
    }

    #[test]
    fn test_pr_transition_is_one_shot() {
        let (store, owner) = store_with_owner();
        let project = store
            .create_project(new_project(&owner, Visibility::Public))
            .unwrap();
        let pr = PullRequest {
            id: ForgeId::new(),
            project_id: project.id,
            source_project_id: None,
            created_by: owner.id,
            title: "t".to_string(),
            description: String::new(),
            source_branch: "feature".to_string(),
            target_branch: "main".to_string(),
            status: PullRequestStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let pr = store.create_pull_request(pr).unwrap();

        let merged = store
            .transition_pull_request(pr.id, PullRequestStatus::Merged)
            .unwrap();
        assert_eq!(merged.status, PullRequestStatus::Merged);

        // the losing transition observes InvalidState, never overwrites
        let err = store
            .transition_pull_request(pr.id, PullRequestStatus::Closed)
            .unwrap_err();
        assert!(err.is_invalid_state());
        let current = store.get_pull_request(project.id, pr.id).unwrap();
        assert_eq!(current.status, PullRequestStatus::Merged);
    }

    #[test]
    fn test_unrelated_source_project_rejected() {
        let (store, owner) = store_with_owner();
        let target = store
            .create_project(new_project(&owner, Visibility::Public))
            .unwrap();
        let unrelated = store
            .create_project(Project::new(
                "beta".to_string(),
                String::new(),
                owner.id,
                Visibility::Public,
            ))
            .unwrap();
        let pr = PullRequest {
            id: ForgeId::new(),
            project_id: target.id,
            source_project_id: Some(unrelated.id),
            created_by: owner.id,
            title: "t".to_string(),
            description: String::new(),
            source_branch: "main".to_string(),
            target_branch: "main".to_string(),
            status: PullRequestStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let err = store.create_pull_request(pr).unwrap_err();
        assert!(err.is_invalid_state());
    }
}
