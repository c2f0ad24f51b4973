//! Core entity types used across the Forge system.

use crate::id::ForgeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: ForgeId,
    pub username: String,
    /// Bcrypt hash, never the plaintext password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a pre-hashed password
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: ForgeId::new(),
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Project visibility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// Represents a version-controlled project.
///
/// `forked_from` is set exactly once at creation and always references the
/// immediate parent, never the ultimate root of a fork chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ForgeId,
    pub name: String,
    pub description: String,
    pub owner_id: ForgeId,
    pub visibility: Visibility,
    pub forked_from: Option<ForgeId>,
    /// Opaque code snapshot; content semantics belong to the VCS layer
    #[serde(default)]
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new root project (not a fork)
    pub fn new(name: String, description: String, owner_id: ForgeId, visibility: Visibility) -> Self {
        let now = Utc::now();
        Self {
            id: ForgeId::new(),
            name,
            description,
            owner_id,
            visibility,
            forked_from: None,
            code: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_fork(&self) -> bool {
        self.forked_from.is_some()
    }
}

/// Collaborator role on a project.
///
/// `Owner` is synthesized from `Project.owner_id` at project creation and is
/// never assignable or removable through the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Maintainer,
    Contributor,
    Viewer,
}

impl Role {
    /// Roles an owner may assign through the registry
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Role::Owner)
    }
}

/// A (user, project, role) membership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collaborator {
    pub id: ForgeId,
    pub project_id: ForgeId,
    pub user_id: ForgeId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Collaborator {
    pub fn new(project_id: ForgeId, user_id: ForgeId, role: Role) -> Self {
        Self {
            id: ForgeId::new(),
            project_id,
            user_id,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Pull request lifecycle state.
///
/// Transitions are one-directional: Open may move to Merged or Closed, both
/// of which are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestStatus {
    Open,
    Merged,
    Closed,
}

impl PullRequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PullRequestStatus::Open)
    }
}

/// A proposal to apply changes from a source branch into a target branch of
/// the target project.
///
/// `source_project_id` is a weak, lookup-only reference: it is set when the
/// PR originates from a fork and must then reference a direct fork of the
/// target project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PullRequest {
    pub id: ForgeId,
    pub project_id: ForgeId,
    pub source_project_id: Option<ForgeId>,
    pub created_by: ForgeId,
    pub title: String,
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub status: PullRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.status == PullRequestStatus::Open
    }
}

/// Per-call git credentials, passed through to the gateway and never stored.
#[derive(Clone, Deserialize)]
pub struct GitCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Display for GitCredentials {
    // Credentials must never leak into logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GitCredentials(username={}, password=***)", self.username)
    }
}

impl std::fmt::Debug for GitCredentials {
    // Same rule as Display: the password never appears, not even via {:?}
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A branch as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchInfo {
    pub name: String,
    pub current: bool,
}
