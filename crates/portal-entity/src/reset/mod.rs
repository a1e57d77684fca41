//! Password-reset credential entities.

pub mod model;

pub use model::{CreateResetCredential, ResetCredential};
