//! Claims carried by portal tokens.
//!
//! Session and reset tokens share one wire shape but decode into distinct
//! variants keyed by the `purpose` field, so a reset token can never be
//! handed to code expecting a session and vice versa.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Authenticates API requests.
    Session,
    /// Authorizes exactly one password change.
    PasswordReset,
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::PasswordReset => write!(f, "password_reset"),
        }
    }
}

/// Claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity id.
    pub user_id: i64,
    /// Username at issuance.
    pub username: String,
    /// Role snapshot at issuance.
    pub roles: Vec<String>,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
}

/// Claims of a password-reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Identity id.
    pub user_id: i64,
    /// Username at issuance.
    pub username: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
}

/// Any token payload, tagged by purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum Claims {
    /// A session token.
    Session(SessionClaims),
    /// A password-reset token.
    PasswordReset(ResetClaims),
}

impl Claims {
    /// The purpose tag.
    pub fn purpose(&self) -> TokenPurpose {
        match self {
            Self::Session(_) => TokenPurpose::Session,
            Self::PasswordReset(_) => TokenPurpose::PasswordReset,
        }
    }

    /// Expiry timestamp in seconds.
    pub fn exp(&self) -> i64 {
        match self {
            Self::Session(c) => c.exp,
            Self::PasswordReset(c) => c.exp,
        }
    }

    /// Identity id.
    pub fn user_id(&self) -> i64 {
        match self {
            Self::Session(c) => c.user_id,
            Self::PasswordReset(c) => c.user_id,
        }
    }

    /// Expiry is exclusive: the token is dead from `exp` onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp()
    }
}

impl SessionClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}
