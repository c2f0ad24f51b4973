//! Pure authorization predicates.
//!
//! Every permission decision in the system flows through the three
//! predicates in this module; call sites never re-derive role logic.
//! The functions are total over well-formed inputs and have no side
//! effects. A missing project is the caller's precondition failure,
//! not this module's concern.

use crate::id::ForgeId;
use crate::types::{Project, Role};
use serde::{Deserialize, Serialize};

/// Tunable access policy.
///
/// `maintainer_can_manage` is a reserved extension point: when enabled,
/// Maintainers gain manage rights (collaborators, merges, visibility).
/// It is off by default and only ever set through configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessPolicy {
    pub maintainer_can_manage: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            maintainer_can_manage: false,
        }
    }
}

/// Whether the caller may see the project at all.
///
/// Public projects are visible to everyone, including anonymous callers.
/// Private projects require ownership or any collaborator role.
pub fn can_view(project: &Project, user_id: Option<ForgeId>, role: Option<Role>) -> bool {
    if project.is_public() {
        return true;
    }
    match user_id {
        Some(uid) => uid == project.owner_id || role.is_some(),
        None => false,
    }
}

/// Whether the caller may modify project code content.
///
/// Viewers and public non-member viewers are read-only.
pub fn can_edit(project: &Project, user_id: Option<ForgeId>, role: Option<Role>) -> bool {
    let Some(uid) = user_id else {
        return false;
    };
    if uid == project.owner_id {
        return true;
    }
    matches!(role, Some(Role::Owner | Role::Maintainer | Role::Contributor))
}

/// Whether the caller may manage the project: collaborators, merges,
/// visibility toggles.
pub fn can_manage(
    project: &Project,
    user_id: Option<ForgeId>,
    role: Option<Role>,
    policy: AccessPolicy,
) -> bool {
    let Some(uid) = user_id else {
        return false;
    };
    if uid == project.owner_id {
        return true;
    }
    if policy.maintainer_can_manage {
        return matches!(role, Some(Role::Owner | Role::Maintainer));
    }
    matches!(role, Some(Role::Owner))
}
