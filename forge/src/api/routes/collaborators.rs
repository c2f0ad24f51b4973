//! Collaborator routes

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::server::AppContext;
use crate::api::types::{AddCollaboratorRequest, ApiResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use forge_core::ForgeId;
use std::time::Instant;
use uuid::Uuid;

/// GET /api/v1/projects/{id}/collaborators - List the team
async fn list_collaborators(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let collaborators = ctx.collaborators.list_collaborators(&user, project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(collaborators, request_id, duration)),
    ))
}

/// POST /api/v1/projects/{id}/collaborators - Add a collaborator
async fn add_collaborator(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let collaborator =
        ctx.collaborators
            .add_collaborator(&user, project_id, &req.username, req.role)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(collaborator, request_id, duration)),
    ))
}

/// DELETE /api/v1/projects/{id}/collaborators/{collaborator_id} - Remove a collaborator
async fn remove_collaborator(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path((project_id, collaborator_id)): Path<(ForgeId, ForgeId)>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    ctx.collaborators
        .remove_collaborator(&user, project_id, collaborator_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "removed": true }),
            request_id,
            duration,
        )),
    ))
}

/// Create collaborator routes
pub fn router() -> Router<AppContext> {
    Router::new()
        .route(
            "/api/v1/projects/{id}/collaborators",
            get(list_collaborators).post(add_collaborator),
        )
        .route(
            "/api/v1/projects/{id}/collaborators/{collaborator_id}",
            delete(remove_collaborator),
        )
}
