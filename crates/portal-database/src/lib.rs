//! # portal-database
//!
//! PostgreSQL connection management, repository traits, and their
//! Postgres-backed and in-memory implementations.

pub mod connection;
pub mod deadline;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{IdentityRepository, PolicyRepository, ResetTokenRepository};
