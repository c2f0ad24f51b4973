//! API route groups

pub mod auth;
pub mod collaborators;
pub mod git;
pub mod health;
pub mod projects;
pub mod public;
pub mod pull_requests;
