//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_entity::policy::PolicyRule;

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
}

/// One policy rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRuleResponse {
    /// Role.
    pub role: String,
    /// Resource path.
    pub resource: String,
    /// Action.
    pub action: String,
}

impl From<PolicyRule> for PolicyRuleResponse {
    fn from(rule: PolicyRule) -> Self {
        Self {
            role: rule.role,
            resource: rule.resource,
            action: rule.action,
        }
    }
}

/// Currently loaded policy rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyListResponse {
    /// Rules in the active snapshot.
    pub rules: Vec<PolicyRuleResponse>,
    /// Number of rules.
    pub count: usize,
}

/// Result of a policy add/remove/reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyChangeResponse {
    /// Whether the store changed. Always true for a reload.
    pub changed: bool,
    /// Rules loaded after the change.
    pub rules_loaded: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Rules in the active policy snapshot.
    pub rules_loaded: usize,
    /// Revocation cache status.
    pub cache: String,
}
