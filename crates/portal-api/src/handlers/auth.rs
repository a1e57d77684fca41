//! Auth handlers: login and logout.

use axum::Json;
use axum::extract::State;

use crate::dto::{LoginRequest, LoginResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .session_manager
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
    }))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.session_manager.logout(&auth.token).await?;
    Ok(Json(MessageResponse::new("logged out")))
}
