//! Core types and abstractions for the Forge collaboration service.
//!
//! This crate provides the entity types, error taxonomy, the pure
//! authorization model, and the git gateway boundary trait used across
//! all Forge components.

pub mod access;
pub mod error;
pub mod id;
pub mod traits;
pub mod types;

pub use access::AccessPolicy;
pub use error::{ForgeError, Result};
pub use id::ForgeId;
pub use traits::*;
pub use types::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::access::AccessPolicy;
    pub use crate::error::{ForgeError, Result};
    pub use crate::id::ForgeId;
    pub use crate::traits::*;
    pub use crate::types::*;
}
