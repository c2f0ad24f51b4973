//! REST API layer
//!
//! Thin HTTP shell over the domain services: extract, delegate, wrap the
//! result in the standard response envelope.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, ApiServer, AppContext};
pub use types::ApiResponse;
