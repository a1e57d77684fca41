//! Collaborator traits defined in `portal-core` and implemented by other crates.

pub mod clock;
pub mod mailer;
pub mod revocation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mailer::Mailer;
pub use revocation::TokenRevocationCache;
