//! Token validation.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use portal_core::config::auth::AuthConfig;
use portal_core::error::AppError;
use portal_core::traits::Clock;

use super::claims::{Claims, ResetClaims, SessionClaims};

/// The single client-visible outcome for every token failure.
pub const INVALID_TOKEN: &str = "invalid or expired token";

/// Verifies signature, expiry, and purpose of portal tokens.
///
/// Purely a function of the token, the secret, and the clock; it never
/// consults the revocation cache or the store.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Time source for expiry.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Verifies signature and expiry and returns the tagged claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(reason = ?e.kind(), "Token rejected");
            AppError::authentication(INVALID_TOKEN)
        })?;

        let claims = data.claims;
        if claims.is_expired_at(self.clock.now()) {
            debug!(exp = claims.exp(), "Token rejected: expired");
            return Err(AppError::authentication(INVALID_TOKEN));
        }
        Ok(claims)
    }

    /// Decodes a token that must be a session token.
    pub fn decode_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        match self.decode(token)? {
            Claims::Session(claims) => Ok(claims),
            other => {
                debug!(purpose = %other.purpose(), "Token rejected: expected session");
                Err(AppError::authentication(INVALID_TOKEN))
            }
        }
    }

    /// Decodes a token that must be a password-reset token.
    pub fn decode_reset(&self, token: &str) -> Result<ResetClaims, AppError> {
        match self.decode(token)? {
            Claims::PasswordReset(claims) => Ok(claims),
            other => {
                debug!(purpose = %other.purpose(), "Token rejected: expected password reset");
                Err(AppError::authentication(INVALID_TOKEN))
            }
        }
    }
}
