//! Reset credential entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted, single-use password-reset credential.
///
/// The row is deleted once consumed, so its absence marks the token as used.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResetCredential {
    /// Row identifier.
    pub id: i64,
    /// Identity the reset applies to.
    pub user_id: i64,
    /// The signed reset token, exactly as mailed.
    #[serde(skip_serializing)]
    pub token: String,
    /// Row expiry, independent of the token's embedded expiry.
    pub expires_at: DateTime<Utc>,
    /// Set while a confirm holds the row.
    pub claimed_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl ResetCredential {
    /// Expiry is exclusive: a row is expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Data required to persist a reset credential.
#[derive(Debug, Clone)]
pub struct CreateResetCredential {
    /// Identity the reset applies to.
    pub user_id: i64,
    /// The signed reset token.
    pub token: String,
    /// Row expiry.
    pub expires_at: DateTime<Utc>,
}
