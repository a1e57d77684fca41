//! # portal-core
//!
//! Core crate for the portal authentication service. Contains configuration
//! schemas, the injectable clock, the collaborator traits (mail delivery,
//! token revocation cache), and the unified error system.
//!
//! This crate has **no** internal dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
