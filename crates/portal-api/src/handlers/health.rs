//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = match state.cache.health_check().await {
        Ok(true) => "connected",
        Ok(false) | Err(_) => "unavailable",
    };
    let rules_loaded = state.rbac_enforcer.rule_count();

    Json(HealthResponse {
        status: if cache == "connected" && rules_loaded > 0 {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        rules_loaded,
        cache: cache.to_string(),
    })
}
