//! Session lifecycle manager: login, per-request authentication and
//! authorization, logout, and administrative revocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use portal_cache::keys::token_fingerprint;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::TokenRevocationCache;
use portal_database::repositories::IdentityRepository;

use crate::jwt::decoder::INVALID_TOKEN;
use crate::jwt::{JwtDecoder, JwtEncoder, SessionClaims};
use crate::password::PasswordHasher;
use crate::rbac::RbacEnforcer;

/// Rejection for unknown usernames and wrong passwords alike.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Rejection for a correct password on a non-active account.
pub const ACCOUNT_NOT_ACTIVE: &str = "account not active";
/// Rejection when no role of the subject grants the action.
pub const ACCESS_DENIED: &str = "access denied";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed session token.
    pub token: String,
    /// Embedded expiry of the token.
    pub expires_at: DateTime<Utc>,
    /// Authenticated identity id.
    pub user_id: i64,
    /// Role snapshot carried by the token.
    pub roles: Vec<String>,
}

/// Composes the credential hasher, token service, revocation cache, and
/// policy engine into the login and protected-route flows.
#[derive(Clone)]
pub struct SessionManager {
    /// Identity lookups.
    identities: Arc<dyn IdentityRepository>,
    /// Password verification.
    hasher: Arc<PasswordHasher>,
    /// Token signing.
    encoder: Arc<JwtEncoder>,
    /// Token verification.
    decoder: Arc<JwtDecoder>,
    /// Live-token registry.
    cache: Arc<dyn TokenRevocationCache>,
    /// Policy engine.
    enforcer: Arc<RbacEnforcer>,
    /// How long a new token stays live in the cache.
    cache_ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        cache: Arc<dyn TokenRevocationCache>,
        enforcer: Arc<RbacEnforcer>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            identities,
            hasher,
            encoder,
            decoder,
            cache,
            enforcer,
            cache_ttl,
        }
    }

    /// The policy engine behind [`authorize`](Self::authorize).
    pub fn enforcer(&self) -> &Arc<RbacEnforcer> {
        &self.enforcer
    }

    /// Login flow: lookup, password check, status check, token issue.
    ///
    /// Unknown usernames and wrong passwords get the same rejection and the
    /// same hashing cost. Account status is disclosed only after the password
    /// has been proven.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let identity = match self.identities.find_by_username(username).await? {
            Some(identity) => identity,
            None => {
                self.hasher.verify_dummy(password);
                info!(username = %username, "Login rejected: unknown user");
                return Err(AppError::authentication(INVALID_CREDENTIALS));
            }
        };

        if !self.hasher.verify(password, &identity.password_hash) {
            info!(user_id = identity.id, "Login rejected: wrong password");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        if !identity.can_login() {
            info!(
                user_id = identity.id,
                status = %identity.status,
                "Login rejected: account not active"
            );
            return Err(AppError::authentication(ACCOUNT_NOT_ACTIVE));
        }

        let issued = self.encoder.issue_session(&identity)?;
        self.cache.register(&issued.token, self.cache_ttl).await?;

        info!(
            user_id = identity.id,
            token = %token_fingerprint(&issued.token),
            "Login successful"
        );

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user_id: identity.id,
            roles: identity.roles,
        })
    }

    /// Protected-route authentication: cache liveness, then signature,
    /// expiry and purpose.
    ///
    /// Every failure here, a cache backend failure included, is an
    /// authentication error.
    pub async fn authenticate(&self, token: &str) -> AppResult<SessionClaims> {
        let live = match self.cache.is_live(token).await {
            Ok(live) => live,
            Err(e) => {
                error!(
                    error = %e.detailed(),
                    "Revocation cache lookup failed; rejecting token"
                );
                false
            }
        };
        if !live {
            debug!(token = %token_fingerprint(token), "Token not live in cache");
            return Err(AppError::authentication(INVALID_TOKEN));
        }

        self.decoder.decode_session(token)
    }

    /// Protected-route authorization: the logical OR of every role the
    /// token carries.
    ///
    /// An engine error on one role is logged and that role is skipped; the
    /// request is denied unless another role permits it.
    pub fn authorize(
        &self,
        claims: &SessionClaims,
        resource: &str,
        action: &str,
    ) -> AppResult<()> {
        for role in &claims.roles {
            match self.enforcer.try_authorize(role, resource, action) {
                Ok(true) => {
                    debug!(
                        user_id = claims.user_id,
                        role = %role,
                        resource,
                        action,
                        "Access granted"
                    );
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => {
                    error!(
                        role = %role,
                        resource,
                        action,
                        error = %e,
                        "Policy check failed"
                    );
                }
            }
        }

        warn!(
            user_id = claims.user_id,
            roles = ?claims.roles,
            resource,
            action,
            "Access denied"
        );
        Err(AppError::authorization(ACCESS_DENIED))
    }

    /// Ends the session carried by `token`.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.cache.revoke(token).await?;
        info!(token = %token_fingerprint(token), "Session logged out");
        Ok(())
    }

    /// Administrative revocation. The token need not be valid or live.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        self.cache.revoke(token).await?;
        info!(token = %token_fingerprint(token), "Token revoked");
        Ok(())
    }
}
