//! Administrative endpoints, all behind the policy guard.

pub mod policies;
pub mod tokens;
