//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use portal_api::{AppState, Backends, build_app};
use portal_auth::PasswordHasher;
use portal_cache::memory::MemoryRevocationCache;
use portal_core::config::AppConfig;
use portal_core::traits::{Mailer, ManualClock};
use portal_database::memory::{
    MemoryIdentityRepository, MemoryPolicyRepository, MemoryResetTokenRepository,
};
use portal_database::repositories::IdentityRepository;
use portal_entity::identity::{CreateIdentity, IdentityStatus};
use portal_mail::testing::{RecordingMailer, extract_reset_token};

/// A password that passes the default strength policy.
pub const STRONG_PASSWORD: &str = "correct-horse-battery-staple";

/// Configuration tuned for tests: fast hashing, no rate limit.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.argon2_memory_kib = 1024;
    config.auth.argon2_iterations = 1;
    config.server.rate_limit_per_minute = 0;
    config
}

/// In-memory backends plus handles for inspecting them.
pub struct Fakes {
    /// Identity store
    pub identities: Arc<MemoryIdentityRepository>,
    /// Reset credential store
    pub resets: Arc<MemoryResetTokenRepository>,
    /// Policy store
    pub policies: Arc<MemoryPolicyRepository>,
    /// Revocation cache
    pub cache: Arc<MemoryRevocationCache>,
    /// Captured email
    pub mailer: Arc<RecordingMailer>,
    /// Controllable time
    pub clock: Arc<ManualClock>,
}

impl Fakes {
    /// Fresh, empty fakes.
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        Self {
            identities: Arc::new(MemoryIdentityRepository::new()),
            resets: Arc::new(MemoryResetTokenRepository::new()),
            policies: Arc::new(MemoryPolicyRepository::new()),
            cache: Arc::new(MemoryRevocationCache::new(10_000, clock.clone())),
            mailer: Arc::new(RecordingMailer::new()),
            clock,
        }
    }

    /// Backends wired to these fakes, optionally with a different mailer.
    pub fn backends(&self, mailer: Option<Arc<dyn Mailer>>) -> Backends {
        Backends {
            identities: self.identities.clone(),
            resets: self.resets.clone(),
            policies: self.policies.clone(),
            cache: self.cache.clone(),
            mailer: mailer.unwrap_or_else(|| self.mailer.clone() as Arc<dyn Mailer>),
            clock: self.clock.clone(),
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Backend fakes
    pub fakes: Fakes,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with default test config
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom config
    pub async fn with_config(config: AppConfig) -> Self {
        Self::build(config, None).await
    }

    /// Create a test application with a custom config and mailer
    pub async fn build(config: AppConfig, mailer: Option<Arc<dyn Mailer>>) -> Self {
        let fakes = Fakes::new();
        let state = AppState::initialize(config.clone(), fakes.backends(mailer))
            .await
            .expect("Failed to initialize app state");

        Self {
            router: build_app(state.clone()),
            state,
            fakes,
            config,
        }
    }

    /// Insert an identity directly into the store
    pub async fn create_identity(
        &self,
        username: &str,
        password: &str,
        roles: &[&str],
        status: IdentityStatus,
    ) -> i64 {
        let hasher = PasswordHasher::new(&self.config.auth).expect("Failed to build hasher");
        self.fakes
            .identities
            .create(&CreateIdentity {
                username: username.to_string(),
                email: None,
                password_hash: hasher.hash(password).expect("Failed to hash password"),
                roles: roles.iter().map(|r| r.to_string()).collect(),
                status,
            })
            .await
            .expect("Failed to create identity")
            .id
    }

    /// Insert an active identity
    pub async fn create_active(&self, username: &str, password: &str, roles: &[&str]) -> i64 {
        self.create_identity(username, password, roles, IdentityStatus::Active)
            .await
    }

    /// Log in and return the session token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/login",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "login failed: {:?}",
            response.body
        );
        response.body["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Request a reset and return the token from the captured email
    pub async fn request_reset_token(&self, username: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/password-reset/request",
                Some(serde_json::json!({ "username": username })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let email = self.fakes.mailer.last().expect("No reset email sent");
        extract_reset_token(&email.html_body).expect("No token in reset email")
    }

    /// Make an HTTP request against the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        self.send(method, path, Body::from(body_str), token).await
    }

    /// Make an HTTP request with a raw body
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        body: Body,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` field of an error body
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
