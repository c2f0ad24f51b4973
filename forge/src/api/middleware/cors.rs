//! CORS configuration

use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS layer for browser clients
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
