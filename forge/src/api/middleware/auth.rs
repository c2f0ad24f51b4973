//! Authentication extractors
//!
//! Handlers take `AuthUser` when a caller must be logged in, or
//! `MaybeUser` on read paths where anonymous access to public resources
//! is allowed.

use crate::api::error::ApiError;
use crate::api::server::AppContext;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use forge_core::{ForgeId, User};

/// A verified, logged-in caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// A caller that may or may not be logged in
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn authenticate(ctx: &AppContext, token: &str) -> Result<User, ApiError> {
    let claims = ctx.auth.verify_token(token)?;
    let user_id = ForgeId::parse(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("malformed token subject".to_string()))?;
    Ok(ctx.auth.get_user(user_id)?)
}

impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid authentication token".to_string())
        })?;
        Ok(AuthUser(authenticate(ctx, token)?))
    }
}

impl FromRequestParts<AppContext> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            // a present-but-invalid token is rejected rather than
            // silently downgraded to anonymous
            Some(token) => Ok(MaybeUser(Some(authenticate(ctx, token)?))),
            None => Ok(MaybeUser(None)),
        }
    }
}
