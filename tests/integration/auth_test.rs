//! Integration tests for login, logout, and protected-route authentication.

use axum::body::Body;
use chrono::Duration;
use http::StatusCode;
use serde_json::json;

use portal_entity::identity::IdentityStatus;

use crate::helpers::{TestApp, test_config};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;

    let response = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "admin123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert!(response.body.get("expires_at").is_some());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;

    let response = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "wrong" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid credentials");
    assert_eq!(response.body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "nobody", "password": "admin123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "invalid credentials");
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = TestApp::new().await;
    app.create_identity("dormant", "admin123", &["admin"], IdentityStatus::Inactive)
        .await;

    let right = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "dormant", "password": "admin123" })),
            None,
        )
        .await;
    assert_eq!(right.status, StatusCode::UNAUTHORIZED);
    assert_eq!(right.error(), "account not active");

    // Status stays hidden until the password is proven.
    let wrong = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "dormant", "password": "nope" })),
            None,
        )
        .await;
    assert_eq!(wrong.error(), "invalid credentials");
}

#[tokio::test]
async fn test_login_invalid_input() {
    let app = TestApp::new().await;

    let missing = app
        .request("POST", "/api/login", Some(json!({ "username": "admin" })), None)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error(), "invalid input");

    let empty = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "", "password": "x" })),
            None,
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let malformed = app
        .send("POST", "/api/login", Body::from("{not json"), None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.error(), "invalid input");
}

#[tokio::test]
async fn test_token_works_until_expiry() {
    let app = TestApp::new().await;
    app.create_active("reader", "admin123", &["end_user_read_only"])
        .await;
    let token = app.login("reader", "admin123").await;

    let ok = app.request("GET", "/api/user", None, Some(&token)).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["message"], "User access granted");

    let ttl = Duration::minutes(app.config.auth.session_ttl_minutes as i64);
    app.fakes.clock.advance(ttl);

    let expired = app.request("GET", "/api/user", None, Some(&token)).await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.error(), "invalid or expired token");
}

#[tokio::test]
async fn test_missing_and_garbage_tokens() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/user", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error(), "missing authorization header");

    let garbage = app
        .request("GET", "/api/user", None, Some("not-a-token"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.error(), "invalid or expired token");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new().await;
    app.create_active("reader", "admin123", &["end_user_read_only"])
        .await;
    let token = app.login("reader", "admin123").await;

    let logout = app.request("POST", "/api/logout", None, Some(&token)).await;
    assert_eq!(logout.status, StatusCode::OK);

    // Signature and expiry are still fine; only the cache entry is gone.
    let after = app.request("GET", "/api/user", None, Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let again = app.request("POST", "/api/logout", None, Some(&token)).await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_revokes_other_session() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;
    app.create_active("reader", "admin123", &["end_user_read_only"])
        .await;
    let admin = app.login("admin", "admin123").await;
    let reader = app.login("reader", "admin123").await;

    let revoke = app
        .request(
            "POST",
            "/api/admin/tokens/revoke",
            Some(json!({ "token": reader })),
            Some(&admin),
        )
        .await;
    assert_eq!(revoke.status, StatusCode::OK);

    let after = app.request("GET", "/api/user", None, Some(&reader)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_concurrent_logins_are_independent() {
    let app = TestApp::new().await;
    app.create_active("reader", "admin123", &["end_user_read_only"])
        .await;
    let first = app.login("reader", "admin123").await;
    let second = app.login("reader", "admin123").await;
    assert_ne!(first, second);

    app.request("POST", "/api/logout", None, Some(&first)).await;
    let still = app.request("GET", "/api/user", None, Some(&second)).await;
    assert_eq!(still.status, StatusCode::OK);
}

#[tokio::test]
async fn test_public_and_health() {
    let app = TestApp::new().await;

    let public = app.request("GET", "/api/public", None, None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.body["message"], "Welcome to the public API");

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(health.body["rules_loaded"], 8);
}

#[tokio::test]
async fn test_rate_limit() {
    let mut config = test_config();
    config.server.rate_limit_per_minute = 2;
    let app = TestApp::with_config(config).await;

    for _ in 0..2 {
        let ok = app.request("GET", "/api/public", None, None).await;
        assert_eq!(ok.status, StatusCode::OK);
    }

    let limited = app.request("GET", "/api/public", None, None).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["code"], "RATE_LIMITED");
}
