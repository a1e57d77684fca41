//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use portal_entity::policy::PolicyRule;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Password reset request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetRequest {
    /// Account to reset.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
}

/// Password reset confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetConfirmRequest {
    /// Reset token from the email link.
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    /// Replacement password.
    #[serde(alias = "newPassword")]
    #[validate(length(min = 1, message = "new_password is required"))]
    pub new_password: String,
}

/// A policy rule to add or remove.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PolicyRuleRequest {
    /// Role.
    #[validate(length(min = 1))]
    pub role: String,
    /// Resource path.
    #[validate(length(min = 1))]
    pub resource: String,
    /// Action (HTTP method).
    #[validate(length(min = 1))]
    pub action: String,
}

impl From<&PolicyRuleRequest> for PolicyRule {
    fn from(req: &PolicyRuleRequest) -> Self {
        PolicyRule::new(req.role.as_str(), req.resource.as_str(), req.action.as_str())
    }
}

/// Administrative token revocation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RevokeTokenRequest {
    /// Session token to revoke.
    #[validate(length(min = 1))]
    pub token: String,
}
