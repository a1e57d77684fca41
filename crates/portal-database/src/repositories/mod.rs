//! Repository traits and their PostgreSQL implementations.
//!
//! The auth layer depends only on the traits so that tests can swap in the
//! in-memory implementations from [`crate::memory`].

pub mod identity;
pub mod policy;
pub mod reset_token;

pub use identity::{IdentityRepository, PgIdentityRepository};
pub use policy::{PgPolicyRepository, PolicyRepository};
pub use reset_token::{PgResetTokenRepository, ResetTokenRepository};
