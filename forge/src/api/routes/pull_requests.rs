//! Pull request routes

use crate::api::error::ApiError;
use crate::api::middleware::{AuthUser, MaybeUser};
use crate::api::server::AppContext;
use crate::api::types::{ApiResponse, CreatePullRequestBody};
use crate::services::pull_request::CreatePullRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use forge_core::ForgeId;
use std::time::Instant;
use uuid::Uuid;

/// GET /api/v1/projects/{id}/pull-requests - List pull requests
async fn list_pull_requests(
    State(ctx): State<AppContext>,
    MaybeUser(user): MaybeUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let pulls = ctx.pull_requests.list(user.as_ref(), project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(pulls, request_id, duration)),
    ))
}

/// POST /api/v1/projects/{id}/pull-requests - Open a pull request
async fn create_pull_request(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<CreatePullRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let pr = ctx.pull_requests.create(
        &user,
        project_id,
        CreatePullRequest {
            title: req.title,
            description: req.description,
            source_branch: req.source_branch,
            target_branch: req.target_branch,
            source_project_id: req.source_project_id,
        },
    )?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(pr, request_id, duration)),
    ))
}

/// POST /api/v1/projects/{id}/pull-requests/{pr_id}/merge - Merge a pull request
async fn merge_pull_request(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path((project_id, pr_id)): Path<(ForgeId, ForgeId)>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let pr = ctx.pull_requests.merge(&user, project_id, pr_id).await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(pr, request_id, duration)),
    ))
}

/// POST /api/v1/projects/{id}/pull-requests/{pr_id}/close - Close a pull request
async fn close_pull_request(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path((project_id, pr_id)): Path<(ForgeId, ForgeId)>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let pr = ctx.pull_requests.close(&user, project_id, pr_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(pr, request_id, duration)),
    ))
}

/// Create pull request routes
pub fn router() -> Router<AppContext> {
    Router::new()
        .route(
            "/api/v1/projects/{id}/pull-requests",
            get(list_pull_requests).post(create_pull_request),
        )
        .route(
            "/api/v1/projects/{id}/pull-requests/{pr_id}/merge",
            post(merge_pull_request),
        )
        .route(
            "/api/v1/projects/{id}/pull-requests/{pr_id}/close",
            post(close_pull_request),
        )
}
