//! Health check route

use crate::api::error::ApiError;
use crate::api::server::AppContext;
use crate::api::types::{ApiResponse, HealthResponse};
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use std::time::Instant;
use uuid::Uuid;

/// GET /api/v1/health - Service health and entity counts
async fn health(State(ctx): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let stats = ctx.store.stats();
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: ctx.start_time.elapsed().as_secs(),
        users: stats.users,
        projects: stats.projects,
    };

    let duration = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(response, request_id, duration)),
    ))
}

/// Create health routes
pub fn router() -> Router<AppContext> {
    Router::new().route("/api/v1/health", get(health))
}
