//! Integration tests for the policy guard and policy administration.

use http::StatusCode;
use serde_json::json;

use portal_api::AppState;
use portal_database::repositories::PolicyRepository;
use portal_entity::policy::PolicyRule;

use crate::helpers::{Fakes, TestApp, test_config};

#[tokio::test]
async fn test_admin_path_by_role() {
    let app = TestApp::new().await;
    app.create_active("reader", "admin123", &["end_user_read_only"])
        .await;
    app.create_active("admin", "admin123", &["admin"]).await;
    let reader = app.login("reader", "admin123").await;
    let admin = app.login("admin", "admin123").await;

    let denied = app.request("GET", "/api/admin", None, Some(&reader)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["error"], "access denied");
    assert_eq!(denied.body["code"], "FORBIDDEN");

    let granted = app.request("GET", "/api/admin", None, Some(&admin)).await;
    assert_eq!(granted.status, StatusCode::OK);
    assert_eq!(granted.body["message"], "Admin access granted");
}

#[tokio::test]
async fn test_roles_are_unioned() {
    let app = TestApp::new().await;
    app.create_active("both", "admin123", &["end_user_read_only", "admin"])
        .await;
    let token = app.login("both", "admin123").await;

    for path in ["/api/admin", "/api/user"] {
        let response = app.request("GET", path, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_no_roles_is_forbidden_not_unauthenticated() {
    let app = TestApp::new().await;
    app.create_active("nobody", "admin123", &[]).await;
    let token = app.login("nobody", "admin123").await;

    let response = app.request("GET", "/api/user", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rule_changes_take_effect() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;
    app.create_active("auditor", "admin123", &["auditor"]).await;
    let admin = app.login("admin", "admin123").await;
    let auditor = app.login("auditor", "admin123").await;
    let rule = json!({ "role": "auditor", "resource": "/api/admin", "action": "get" });

    let before = app.request("GET", "/api/admin", None, Some(&auditor)).await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);

    let added = app
        .request("POST", "/api/admin/policies", Some(rule.clone()), Some(&admin))
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body["changed"], true);
    assert_eq!(added.body["rules_loaded"], 9);

    let during = app.request("GET", "/api/admin", None, Some(&auditor)).await;
    assert_eq!(during.status, StatusCode::OK);

    let removed = app
        .request("DELETE", "/api/admin/policies", Some(rule), Some(&admin))
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["changed"], true);

    let after = app.request("GET", "/api/admin", None, Some(&auditor)).await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reload_picks_up_store_changes() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;
    app.create_active("auditor", "admin123", &["auditor"]).await;
    let admin = app.login("admin", "admin123").await;
    let auditor = app.login("auditor", "admin123").await;

    app.fakes
        .policies
        .add(&PolicyRule::new("auditor", "/api/user", "GET"))
        .await
        .unwrap();

    let stale = app.request("GET", "/api/user", None, Some(&auditor)).await;
    assert_eq!(stale.status, StatusCode::FORBIDDEN);

    let reload = app
        .request("POST", "/api/admin/policies/reload", None, Some(&admin))
        .await;
    assert_eq!(reload.status, StatusCode::OK);
    assert_eq!(reload.body["rules_loaded"], 9);

    let fresh = app.request("GET", "/api/user", None, Some(&auditor)).await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_rules() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;
    let admin = app.login("admin", "admin123").await;

    app.fakes.policies.set_unavailable(true);

    let reload = app
        .request("POST", "/api/admin/policies/reload", None, Some(&admin))
        .await;
    assert_eq!(reload.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reload.error(), "internal server error");

    let still = app.request("GET", "/api/admin", None, Some(&admin)).await;
    assert_eq!(still.status, StatusCode::OK);
}

#[tokio::test]
async fn test_policy_admin_requires_admin() {
    let app = TestApp::new().await;
    app.create_active("reader", "admin123", &["end_user_read_only"])
        .await;
    let reader = app.login("reader", "admin123").await;

    let list = app
        .request("GET", "/api/admin/policies", None, Some(&reader))
        .await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);

    let add = app
        .request(
            "POST",
            "/api/admin/policies",
            Some(json!({
                "role": "end_user_read_only",
                "resource": "/api/admin",
                "action": "GET",
            })),
            Some(&reader),
        )
        .await;
    assert_eq!(add.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_policies() {
    let app = TestApp::new().await;
    app.create_active("admin", "admin123", &["admin"]).await;
    let admin = app.login("admin", "admin123").await;

    let list = app
        .request("GET", "/api/admin/policies", None, Some(&admin))
        .await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 8);
    let rules = list.body["rules"].as_array().unwrap();
    assert!(rules.iter().any(|r| r["role"] == "end_user_manager"
        && r["resource"] == "/api/user"
        && r["action"] == "GET"));
}

#[tokio::test]
async fn test_bootstrap_seeds_empty_store() {
    let app = TestApp::new().await;
    assert_eq!(app.fakes.policies.count().await.unwrap(), 8);
    assert_eq!(app.state.rbac_enforcer.rule_count(), 8);
}

#[tokio::test]
async fn test_unreachable_rule_store_fails_startup() {
    let fakes = Fakes::new();
    fakes.policies.set_unavailable(true);

    let result = AppState::initialize(test_config(), fakes.backends(None)).await;
    assert!(result.is_err());
}
