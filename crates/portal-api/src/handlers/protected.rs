//! Policy-guarded demo areas.

use axum::Json;

use crate::dto::MessageResponse;
use crate::extractors::AuthUser;

/// GET /api/admin
pub async fn admin_area(auth: AuthUser) -> Json<MessageResponse> {
    tracing::debug!(user_id = auth.user_id, "Admin area accessed");
    Json(MessageResponse::new("Admin access granted"))
}

/// GET /api/user
pub async fn user_area(auth: AuthUser) -> Json<MessageResponse> {
    tracing::debug!(user_id = auth.user_id, "User area accessed");
    Json(MessageResponse::new("User access granted"))
}
