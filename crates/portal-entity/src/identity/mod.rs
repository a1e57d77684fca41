//! Identity domain entities.

pub mod model;
pub mod status;

pub use model::{CreateIdentity, Identity};
pub use status::IdentityStatus;
