//! Forge: a project collaboration and pull-request service.
//!
//! Users own version-controlled projects, toggle their visibility, fork
//! visible projects, and propose changes upstream through pull requests.
//! This crate hosts the REST API, the domain services, and the local git
//! gateway implementation.

pub mod api;
pub mod config;
pub mod services;
