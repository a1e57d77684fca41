//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use portal_auth::{
    JwtDecoder, JwtEncoder, PasswordHasher, PasswordResetManager, RbacEnforcer, ResetCleanup,
    SessionManager,
};
use portal_core::config::AppConfig;
use portal_core::result::AppResult;
use portal_core::traits::{Clock, Mailer, TokenRevocationCache};
use portal_database::repositories::{IdentityRepository, PolicyRepository, ResetTokenRepository};
use portal_entity::policy::PolicyRule;

use crate::middleware::rate_limit::RateLimiter;

/// Storage and delivery backends the auth core is assembled from.
///
/// The server passes Postgres repositories, the configured cache and the
/// configured mailer; tests pass in-memory fakes and a manual clock.
#[derive(Clone)]
pub struct Backends {
    /// Identity store.
    pub identities: Arc<dyn IdentityRepository>,
    /// Reset credential store.
    pub resets: Arc<dyn ResetTokenRepository>,
    /// Policy rule store.
    pub policies: Arc<dyn PolicyRepository>,
    /// Revocation cache.
    pub cache: Arc<dyn TokenRevocationCache>,
    /// Outbound email.
    pub mailer: Arc<dyn Mailer>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Server start time
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// Revocation cache
    pub cache: Arc<dyn TokenRevocationCache>,
    /// Per-IP rate limiter (absent when disabled)
    pub rate_limiter: Option<RateLimiter>,

    // ── Auth ─────────────────────────────────────────────────
    /// Policy engine
    pub rbac_enforcer: Arc<RbacEnforcer>,
    /// Login and protected-route flows
    pub session_manager: Arc<SessionManager>,
    /// Password reset flows
    pub reset_manager: Arc<PasswordResetManager>,
    /// Expired-state housekeeping
    pub reset_cleanup: Arc<ResetCleanup>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("rbac_enforcer", &self.rbac_enforcer)
            .field("session_manager", &self.session_manager)
            .finish()
    }
}

impl AppState {
    /// Wires the auth core on top of `backends`.
    ///
    /// Seeds and loads the policy engine; a store failure here aborts
    /// startup rather than serving with an empty rule set.
    pub async fn initialize(config: AppConfig, backends: Backends) -> AppResult<Self> {
        let bootstrap: Vec<PolicyRule> = config
            .policy
            .bootstrap_rules
            .iter()
            .map(PolicyRule::from)
            .collect();
        let rbac_enforcer =
            Arc::new(RbacEnforcer::initialize(backends.policies, &bootstrap).await?);

        let password_hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth, backends.clock.clone()));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, backends.clock.clone()));

        let session_manager = Arc::new(SessionManager::new(
            Arc::clone(&backends.identities),
            Arc::clone(&password_hasher),
            Arc::clone(&jwt_encoder),
            Arc::clone(&jwt_decoder),
            Arc::clone(&backends.cache),
            Arc::clone(&rbac_enforcer),
            Duration::from_secs(config.cache.token_ttl_seconds),
        ));

        let reset_manager = Arc::new(PasswordResetManager::new(
            &config,
            Arc::clone(&backends.identities),
            Arc::clone(&backends.resets),
            jwt_encoder,
            jwt_decoder,
            password_hasher,
            backends.mailer,
            Arc::clone(&backends.clock),
        ));

        let reset_cleanup = Arc::new(ResetCleanup::new(
            backends.resets,
            Arc::clone(&backends.cache),
            backends.clock,
        ));

        Ok(Self {
            rate_limiter: RateLimiter::per_minute(config.server.rate_limit_per_minute),
            config: Arc::new(config),
            started_at: Instant::now(),
            cache: backends.cache,
            rbac_enforcer,
            session_manager,
            reset_manager,
            reset_cleanup,
        })
    }
}
