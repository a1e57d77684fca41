//! # portal-auth
//!
//! Authentication and authorization core of the portal.
//!
//! ## Modules
//!
//! - `jwt`: signed session and password-reset tokens with tagged claims
//! - `password`: Argon2id hashing and new-password policy
//! - `rbac`: the role → resource → action policy engine
//! - `session`: login, protected-route authentication/authorization, logout
//! - `reset`: password-reset request/confirm flows and expired-row cleanup

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod reset;
pub mod session;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, ResetClaims, SessionClaims, TokenPurpose};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{RbacEnforcer, RuleSet};
pub use reset::{CleanupReport, PasswordResetManager, ResetCleanup, ResetRequestOutcome};
pub use session::{LoginOutcome, SessionManager};
