//! Domain services
//!
//! Each service owns one slice of the domain and is shared between the
//! API handlers. Every permission decision is delegated to the
//! authorization predicates in `forge-core`.

pub mod auth;
pub mod collaborator;
pub mod git;
pub mod project;
pub mod pull_request;

pub use auth::AuthService;
pub use collaborator::CollaboratorService;
pub use git::{GitSyncService, LocalGitGateway};
pub use project::ProjectService;
pub use pull_request::PullRequestService;
