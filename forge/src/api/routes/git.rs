//! Git synchronization routes
//!
//! Request credentials are forwarded to the gateway for the duration of
//! the call and never stored or logged.

use crate::api::error::ApiError;
use crate::api::middleware::{AuthUser, MaybeUser};
use crate::api::server::AppContext;
use crate::api::types::{
    ApiResponse, CloneRequest, CloneResponse, CreateBranchRequest, CredentialsBody, SyncRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use forge_core::{ForgeId, GitCredentials};
use std::time::Instant;
use uuid::Uuid;

fn to_credentials(body: Option<CredentialsBody>) -> Option<GitCredentials> {
    body.map(|c| GitCredentials {
        username: c.username,
        password: c.password,
    })
}

/// POST /api/v1/projects/{id}/git/clone - Clone or attach to a remote
async fn clone_repo(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<CloneRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let auth = to_credentials(req.auth);
    let path = ctx
        .git
        .clone_repo(
            &user,
            project_id,
            &req.remote_url,
            req.branch.as_deref(),
            auth.as_ref(),
        )
        .await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            CloneResponse { path },
            request_id,
            duration,
        )),
    ))
}

/// GET /api/v1/projects/{id}/git/branches - List branches
async fn list_branches(
    State(ctx): State<AppContext>,
    MaybeUser(user): MaybeUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let branches = ctx.git.list_branches(user.as_ref(), project_id).await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(branches, request_id, duration)),
    ))
}

/// POST /api/v1/projects/{id}/git/branches - Create a branch
async fn create_branch(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<CreateBranchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    ctx.git.create_branch(&user, project_id, &req.name).await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            serde_json::json!({ "created": req.name }),
            request_id,
            duration,
        )),
    ))
}

/// POST /api/v1/projects/{id}/git/pull - Pull from origin
async fn pull(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<SyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let auth = to_credentials(req.auth);
    ctx.git
        .pull(&user, project_id, req.branch.as_deref(), auth.as_ref())
        .await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "pulled": true }),
            request_id,
            duration,
        )),
    ))
}

/// POST /api/v1/projects/{id}/git/push - Push to origin
async fn push(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<SyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let auth = to_credentials(req.auth);
    ctx.git
        .push(&user, project_id, req.branch.as_deref(), auth.as_ref())
        .await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "pushed": true }),
            request_id,
            duration,
        )),
    ))
}

/// Create git routes
pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/v1/projects/{id}/git/clone", post(clone_repo))
        .route(
            "/api/v1/projects/{id}/git/branches",
            get(list_branches).post(create_branch),
        )
        .route("/api/v1/projects/{id}/git/pull", post(pull))
        .route("/api/v1/projects/{id}/git/push", post(push))
}
