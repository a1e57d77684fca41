//! Policy guard for protected routes.
//!
//! Runs the protected-route flow in order: token presence, cache liveness,
//! signature and expiry, then role authorization against the request path
//! and method. Anything failing before the role check is a 401; a role
//! denial is a 403.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::{AuthUser, bearer_token};
use crate::state::AppState;

/// Route layer that admits only callers whose roles permit the request.
///
/// On success the verified [`AuthUser`] is stored in the request
/// extensions for handlers to pick up.
pub async fn require_policy(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let claims = state.session_manager.authenticate(&token).await?;

    state.session_manager.authorize(
        &claims,
        request.uri().path(),
        request.method().as_str(),
    )?;

    request.extensions_mut().insert(AuthUser { claims, token });
    Ok(next.run(request).await)
}
