//! Unauthenticated endpoints.

use axum::Json;

use crate::dto::MessageResponse;

/// GET /api/public
pub async fn public_info() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the public API"))
}
