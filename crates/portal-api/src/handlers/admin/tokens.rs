//! Administrative token revocation.

use axum::Json;
use axum::extract::State;

use crate::dto::{MessageResponse, RevokeTokenRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/admin/tokens/revoke
pub async fn revoke_token(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RevokeTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.session_manager.revoke(&req.token).await?;
    tracing::info!(admin_id = auth.user_id, "Token revoked via API");
    Ok(Json(MessageResponse::new("token revoked")))
}
