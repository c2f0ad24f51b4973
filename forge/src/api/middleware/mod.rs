//! API middleware

pub mod auth;
pub mod cors;

pub use auth::{AuthUser, MaybeUser};
pub use cors::cors_layer;
