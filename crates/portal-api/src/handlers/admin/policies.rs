//! Policy rule administration.

use axum::Json;
use axum::extract::State;
use tracing::info;

use portal_entity::policy::PolicyRule;

use crate::dto::{
    PolicyChangeResponse, PolicyListResponse, PolicyRuleRequest, PolicyRuleResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/admin/policies
pub async fn list_policies(
    State(state): State<AppState>,
) -> Result<Json<PolicyListResponse>, ApiError> {
    let rules: Vec<PolicyRuleResponse> = state
        .rbac_enforcer
        .snapshot()?
        .rules()
        .into_iter()
        .map(PolicyRuleResponse::from)
        .collect();

    Ok(Json(PolicyListResponse {
        count: rules.len(),
        rules,
    }))
}

/// POST /api/admin/policies
pub async fn add_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<PolicyRuleRequest>,
) -> Result<Json<PolicyChangeResponse>, ApiError> {
    let rule = PolicyRule::from(&req);
    let changed = state.rbac_enforcer.add_rule(&rule).await?;
    info!(admin_id = auth.user_id, role = %rule.role, "Policy rule added via API");

    Ok(Json(PolicyChangeResponse {
        changed,
        rules_loaded: state.rbac_enforcer.rule_count(),
    }))
}

/// DELETE /api/admin/policies
pub async fn remove_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<PolicyRuleRequest>,
) -> Result<Json<PolicyChangeResponse>, ApiError> {
    let rule = PolicyRule::from(&req);
    let changed = state.rbac_enforcer.remove_rule(&rule).await?;
    info!(
        admin_id = auth.user_id,
        role = %rule.role,
        "Policy rule removed via API"
    );

    Ok(Json(PolicyChangeResponse {
        changed,
        rules_loaded: state.rbac_enforcer.rule_count(),
    }))
}

/// POST /api/admin/policies/reload
pub async fn reload_policies(
    State(state): State<AppState>,
) -> Result<Json<PolicyChangeResponse>, ApiError> {
    let rules_loaded = state.rbac_enforcer.load().await?;
    Ok(Json(PolicyChangeResponse {
        changed: true,
        rules_loaded,
    }))
}
