//! Project routes

use crate::api::error::ApiError;
use crate::api::middleware::{AuthUser, MaybeUser};
use crate::api::server::AppContext;
use crate::api::types::{
    ApiResponse, CodeResponse, CreateProjectRequest, SaveCodeRequest, SetVisibilityRequest,
    UpdateProjectRequest,
};
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

/// POST /api/v1/projects - Create a project
async fn create_project(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let project = ctx
        .projects
        .create_project(&user, req.name, req.description, req.visibility)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(project, request_id, duration)),
    ))
}

/// GET /api/v1/projects - List the caller's projects
async fn list_projects(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let projects = ctx.projects.list_projects(&user);

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(projects, request_id, duration)),
    ))
}

/// GET /api/v1/projects/{id} - Get a project
async fn get_project(
    State(ctx): State<AppContext>,
    MaybeUser(user): MaybeUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let project = ctx.projects.get_project(user.as_ref(), project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(project, request_id, duration)),
    ))
}

/// PUT /api/v1/projects/{id} - Update name and description
async fn update_project(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let project = ctx
        .projects
        .update_project(&user, project_id, req.name, req.description)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(project, request_id, duration)),
    ))
}

/// DELETE /api/v1/projects/{id} - Delete a project
async fn delete_project(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    ctx.projects.delete_project(&user, project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "deleted": true }),
            request_id,
            duration,
        )),
    ))
}

/// POST /api/v1/projects/{id}/visibility - Toggle visibility
async fn set_visibility(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<SetVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let project = ctx.projects.set_visibility(&user, project_id, req.visibility)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(project, request_id, duration)),
    ))
}

/// POST /api/v1/projects/{id}/fork - Fork a visible project
async fn fork_project(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let fork = ctx.projects.fork_project(&user, project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(fork, request_id, duration)),
    ))
}

/// GET /api/v1/projects/{id}/code - Read the code snapshot
async fn get_code(
    State(ctx): State<AppContext>,
    MaybeUser(user): MaybeUser,
    Path(project_id): Path<ForgeId>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let code = ctx.projects.get_code(user.as_ref(), project_id)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            CodeResponse { code },
            request_id,
            duration,
        )),
    ))
}

/// PUT /api/v1/projects/{id}/code - Save the code snapshot
async fn save_code(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<ForgeId>,
    Json(req): Json<SaveCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let project = ctx.projects.save_code(&user, project_id, req.code)?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(project, request_id, duration)),
    ))
}

/// Create project routes
pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/v1/projects", post(create_project).get(list_projects))
        .route(
            "/api/v1/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/v1/projects/{id}/visibility", post(set_visibility))
        .route("/api/v1/projects/{id}/fork", post(fork_project))
        .route("/api/v1/projects/{id}/code", get(get_code).put(save_code))
}
