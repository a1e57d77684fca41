//! Password reset handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::{MessageResponse, ResetConfirmRequest, ResetRequest};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Response to every accepted reset request, delivered or concealed.
pub const RESET_REQUESTED: &str =
    "if the account exists, a password reset email has been sent";
/// Response to a successful reset confirmation.
pub const RESET_CONFIRMED: &str = "password reset successful";

/// POST /api/password-reset/request
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.reset_manager.request_reset(&req.username).await?;
    Ok(Json(MessageResponse::new(RESET_REQUESTED)))
}

/// POST /api/password-reset/confirm
pub async fn confirm_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetConfirmRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .reset_manager
        .confirm_reset(&req.token, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new(RESET_CONFIRMED)))
}
