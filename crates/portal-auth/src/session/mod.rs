//! Login, protected-route checks, and logout.

pub mod manager;

pub use manager::{LoginOutcome, SessionManager};
