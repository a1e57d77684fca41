//! In-memory repository implementations.
//!
//! Used by unit and integration tests, and by the CLI's dry runs. Each store
//! can be switched into a failing mode to exercise dependency-error paths.

pub mod identity;
pub mod policy;
pub mod reset_token;

pub use identity::MemoryIdentityRepository;
pub use policy::MemoryPolicyRepository;
pub use reset_token::MemoryResetTokenRepository;

use portal_core::error::AppError;

fn unavailable(operation: &str) -> AppError {
    AppError::database(format!("{operation}: store unavailable"))
}
