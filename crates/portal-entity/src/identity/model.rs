//! Identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::IdentityStatus;

/// A registered portal account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Unique identifier.
    pub id: i64,
    /// Unique, case-sensitive login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role names, in assignment order.
    pub roles: Vec<String>,
    /// Account status.
    pub status: IdentityStatus,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Check if the identity can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Address that password-reset mail goes to.
    ///
    /// The stored email wins; otherwise the username is used when it looks
    /// like an address.
    pub fn reset_recipient(&self) -> Option<&str> {
        match self.email.as_deref() {
            Some(email) if !email.trim().is_empty() => Some(email),
            _ if self.username.contains('@') => Some(&self.username),
            _ => None,
        }
    }
}

/// Data required to create a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIdentity {
    /// Desired username.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned roles.
    pub roles: Vec<String>,
    /// Initial status.
    pub status: IdentityStatus,
}
