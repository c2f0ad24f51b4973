//! Authoritative entity storage for the Forge system.
//!
//! Keeps users, projects, collaborators and pull requests in memory behind
//! a single lock, with the secondary indexes needed for constant-time
//! permission checks and the compare-and-set updates the lifecycle rules
//! require.

pub mod store;

pub use store::{ForgeStore, StoreStats};
