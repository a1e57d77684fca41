//! Integration tests for the password reset flows.

use std::sync::Arc;

use chrono::Duration;
use http::StatusCode;
use serde_json::json;

use portal_core::traits::Clock;
use portal_entity::identity::IdentityStatus;
use portal_mail::testing::FailingMailer;

use crate::helpers::{STRONG_PASSWORD, TestApp, TestResponse, test_config};

const REQUESTED: &str = "if the account exists, a password reset email has been sent";

async fn confirm(app: &TestApp, token: &str, password: &str) -> TestResponse {
    app.request(
        "POST",
        "/api/password-reset/confirm",
        Some(json!({ "token": token, "new_password": password })),
        None,
    )
    .await
}

#[tokio::test]
async fn test_full_reset_flow() {
    let app = TestApp::new().await;
    app.create_active("alice@example.com", "admin123", &["end_user_read_only"])
        .await;

    let token = app.request_reset_token("alice@example.com").await;
    let email = app.fakes.mailer.last().unwrap();
    assert_eq!(email.to, "alice@example.com");
    assert!(email.html_body.contains("http://localhost:8080/reset?token="));

    let confirmed = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(confirmed.body["message"], "password reset successful");

    app.login("alice@example.com", STRONG_PASSWORD).await;
    let old = app
        .request(
            "POST",
            "/api/login",
            Some(json!({ "username": "alice@example.com", "password": "admin123" })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_confirm_is_single_use() {
    let app = TestApp::new().await;
    app.create_active("bob@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("bob@example.com").await;

    let first = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(first.status, StatusCode::OK);

    let replay = confirm(&app, &token, "another-long-passphrase-42").await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.error(), "invalid or expired token");
}

#[tokio::test]
async fn test_expired_row_rejected_despite_valid_signature() {
    let app = TestApp::new().await;
    app.create_active("carol@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("carol@example.com").await;

    let row = app.fakes.resets.rows().await.remove(0);
    app.fakes
        .resets
        .set_expires_at(row.id, app.fakes.clock.now() - Duration::minutes(1))
        .await;

    let response = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "token expired");
}

#[tokio::test]
async fn test_row_expiring_now_is_expired() {
    let app = TestApp::new().await;
    app.create_active("dave@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("dave@example.com").await;

    let row = app.fakes.resets.rows().await.remove(0);
    app.fakes.clock.set(row.expires_at);

    let response = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_token_cannot_confirm_reset() {
    let app = TestApp::new().await;
    app.create_active("erin@example.com", "admin123", &["end_user_read_only"])
        .await;
    let session = app.login("erin@example.com", "admin123").await;

    let response = confirm(&app, &session, STRONG_PASSWORD).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "invalid or expired token");
}

#[tokio::test]
async fn test_reset_token_cannot_authenticate() {
    let app = TestApp::new().await;
    app.create_active("frank@example.com", "admin123", &["end_user_read_only"])
        .await;
    let token = app.request_reset_token("frank@example.com").await;

    let response = app.request("GET", "/api/user", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_account_is_concealed() {
    let app = TestApp::new().await;
    app.create_identity("gone@example.com", "admin123", &[], IdentityStatus::Inactive)
        .await;

    for username in ["ghost@example.com", "gone@example.com"] {
        let response = app
            .request(
                "POST",
                "/api/password-reset/request",
                Some(json!({ "username": username })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], REQUESTED);
    }
    assert!(app.fakes.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_account_404_when_not_concealed() {
    let mut config = test_config();
    config.auth.conceal_unknown_reset_accounts = false;
    let app = TestApp::with_config(config).await;

    let response = app
        .request(
            "POST",
            "/api/password-reset/request",
            Some(json!({ "username": "ghost@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "user not found or inactive");
}

#[tokio::test]
async fn test_delivery_failure_is_500() {
    let app = TestApp::build(test_config(), Some(Arc::new(FailingMailer))).await;
    app.create_active("gina@example.com", "admin123", &[]).await;

    let response = app
        .request(
            "POST",
            "/api/password-reset/request",
            Some(json!({ "username": "gina@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "internal server error");
    assert!(app.fakes.resets.rows().await.is_empty());
}

#[tokio::test]
async fn test_store_failure_keeps_token_usable() {
    let app = TestApp::new().await;
    app.create_active("hank@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("hank@example.com").await;

    app.fakes.identities.fail_password_updates(true);
    let failed = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);

    app.fakes.identities.fail_password_updates(false);
    let retried = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(retried.status, StatusCode::OK);
}

#[tokio::test]
async fn test_row_delete_failure_still_succeeds() {
    let app = TestApp::new().await;
    app.create_active("ivy@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("ivy@example.com").await;

    app.fakes.resets.fail_deletes(true);
    let response = confirm(&app, &token, STRONG_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    app.login("ivy@example.com", STRONG_PASSWORD).await;
}

#[tokio::test]
async fn test_weak_password_rejected() {
    let app = TestApp::new().await;
    app.create_active("jay@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("jay@example.com").await;

    let response = confirm(&app, &token, "short").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_camel_case_field_accepted() {
    let app = TestApp::new().await;
    app.create_active("kim@example.com", "admin123", &[]).await;
    let token = app.request_reset_token("kim@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/password-reset/confirm",
            Some(json!({ "token": token, "newPassword": STRONG_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_cleanup_purges_expired_rows() {
    let app = TestApp::new().await;
    app.create_active("lee@example.com", "admin123", &[]).await;
    app.request_reset_token("lee@example.com").await;

    app.fakes.clock.advance(Duration::minutes(61));
    let report = app.state.reset_cleanup.run_cleanup().await.unwrap();
    assert_eq!(report.reset_rows, 1);
    assert!(app.fakes.resets.rows().await.is_empty());
}
