//! Token creation with configurable signing and TTL.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use portal_core::config::auth::AuthConfig;
use portal_core::error::AppError;
use portal_core::traits::Clock;
use portal_entity::identity::Identity;

use super::claims::{Claims, ResetClaims, SessionClaims, TokenPurpose};

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token string.
    pub token: String,
    /// Embedded expiry.
    pub expires_at: DateTime<Utc>,
    /// Unique token id.
    pub jti: Uuid,
}

/// Creates HS256-signed session and reset tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Session token lifetime.
    session_ttl: Duration,
    /// Reset token lifetime.
    reset_ttl: Duration,
    /// Source of `iat`.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("session_ttl", &self.session_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            session_ttl: Duration::minutes(config.session_ttl_minutes as i64),
            reset_ttl: Duration::minutes(config.reset_token_ttl_minutes as i64),
            clock,
        }
    }

    /// Lifetime of reset tokens.
    pub fn reset_ttl(&self) -> Duration {
        self.reset_ttl
    }

    /// Signs a token for `identity` with the given purpose and lifetime.
    ///
    /// Roles are embedded only in session tokens.
    pub fn issue(
        &self,
        identity: &Identity,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        // `exp` has whole-second resolution; the reported expiry must match it.
        let now = self.clock.now().trunc_subsecs(0);
        let expires_at = now + ttl;
        let jti = Uuid::new_v4();

        let claims = match purpose {
            TokenPurpose::Session => Claims::Session(SessionClaims {
                user_id: identity.id,
                username: identity.username.clone(),
                roles: identity.roles.clone(),
                iat: now.timestamp(),
                exp: expires_at.timestamp(),
                jti,
            }),
            TokenPurpose::PasswordReset => Claims::PasswordReset(ResetClaims {
                user_id: identity.id,
                username: identity.username.clone(),
                iat: now.timestamp(),
                exp: expires_at.timestamp(),
                jti,
            }),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {purpose} token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at,
            jti,
        })
    }

    /// Signs a session token with the configured session lifetime.
    pub fn issue_session(&self, identity: &Identity) -> Result<IssuedToken, AppError> {
        self.issue(identity, TokenPurpose::Session, self.session_ttl)
    }

    /// Signs a reset token with the configured reset lifetime.
    pub fn issue_reset(&self, identity: &Identity) -> Result<IssuedToken, AppError> {
        self.issue(identity, TokenPurpose::PasswordReset, self.reset_ttl)
    }
}
