//! API request and response types

use chrono::{DateTime, Utc};
use forge_core::{ForgeId, Role, Visibility};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub metadata: ApiMetadata,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, request_id: String, duration_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: ApiMetadata::new(request_id, duration_ms),
        }
    }
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMetadata {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub duration_ms: u64,
}

impl ApiMetadata {
    pub fn new(request_id: String, duration_ms: u64) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            version: "v1".to_string(),
            duration_ms,
        }
    }
}

// ============================================================================
// Auth Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Project Types
// ============================================================================

fn default_visibility() -> Visibility {
    Visibility::Private
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SetVisibilityRequest {
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct SaveCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
}

// ============================================================================
// Collaborator Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddCollaboratorRequest {
    pub username: String,
    pub role: Role,
}

// ============================================================================
// Pull Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePullRequestBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub source_project_id: Option<ForgeId>,
}

// ============================================================================
// Git Types
// ============================================================================

/// Per-call git credentials. Passed through to the gateway, never stored.
#[derive(Deserialize)]
pub struct CredentialsBody {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsBody {
    // Request bodies get debug-formatted in traces; the password never does
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsBody")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct CloneRequest {
    pub remote_url: String,
    pub branch: Option<String>,
    pub auth: Option<CredentialsBody>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct SyncRequest {
    pub branch: Option<String>,
    pub auth: Option<CredentialsBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CloneResponse {
    pub path: String,
}

// ============================================================================
// Health Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub users: usize,
    pub projects: usize,
}
