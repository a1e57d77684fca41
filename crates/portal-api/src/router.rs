//! Route definitions for the portal HTTP API.
//!
//! Routes carry their full `/api/...` path so the policy guard can match
//! the request path against stored rules verbatim.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(auth_routes())
        .merge(password_reset_routes())
        .merge(protected_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Endpoints open to everyone.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/public", get(handlers::public::public_info))
        .route("/api/health", get(handlers::health::health))
}

/// Login and logout. Logout authenticates but applies no role check.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
}

/// Password reset request and confirmation.
fn password_reset_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/password-reset/request",
            post(handlers::password_reset::request_reset),
        )
        .route(
            "/api/password-reset/confirm",
            post(handlers::password_reset::confirm_reset),
        )
}

/// Everything behind the policy guard.
fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::admin::{policies, tokens};

    Router::new()
        .route("/api/admin", get(handlers::protected::admin_area))
        .route("/api/user", get(handlers::protected::user_area))
        .route(
            "/api/admin/policies",
            get(policies::list_policies)
                .post(policies::add_policy)
                .delete(policies::remove_policy),
        )
        .route(
            "/api/admin/policies/reload",
            post(policies::reload_policies),
        )
        .route("/api/admin/tokens/revoke", post(tokens::revoke_token))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::policy::require_policy,
        ))
}
