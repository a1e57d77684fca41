//! Single-use password-reset credentials.

pub mod cleanup;
pub mod manager;

pub use cleanup::{CleanupReport, ResetCleanup};
pub use manager::{PasswordResetManager, ResetRequestOutcome};
