//! Authentication routes

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::server::AppContext;
use crate::api::types::{ApiResponse, LoginRequest, RegisterRequest};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::time::Instant;
use uuid::Uuid;

/// POST /api/v1/auth/register - Create an account and log in
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let authenticated = ctx.auth.register(req.username, req.password).await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(authenticated, request_id, duration)),
    ))
}

/// POST /api/v1/auth/login - User login
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let authenticated = ctx.auth.login(&req.username, &req.password).await?;

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(authenticated, request_id, duration)),
    ))
}

/// GET /api/v1/auth/me - Get current user info
async fn me(AuthUser(user): AuthUser) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(user, request_id, duration)),
    ))
}

/// Create authentication routes
pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(me))
}
