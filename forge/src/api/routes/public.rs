//! Public discovery routes, no authentication required

use crate::api::error::ApiError;
use crate::api::server::AppContext;
use crate::api::types::ApiResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use forge_core::ForgeId;
use std::time::Instant;
use uuid::Uuid;

/// GET /api/v1/public/projects - List all public projects
async fn list_public_projects(
    State(ctx): State<AppContext>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let projects = ctx.projects.list_public_projects();

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(projects, request_id, duration)),
    ))
}

/// GET /api/v1/public/projects/{id} - Get a public project
async fn get_public_project(
    State(ctx): State<AppContext>,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let project = ctx.projects.get_public_project(project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(project, request_id, duration)),
    ))
}

/// Create public routes
pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/v1/public/projects", get(list_public_projects))
        .route("/api/v1/public/projects/{id}", get(get_public_project))
}
