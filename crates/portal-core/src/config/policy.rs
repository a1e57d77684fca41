//! Authorization policy configuration.

use serde::{Deserialize, Serialize};

/// A `(role, resource, action)` triple as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Role name.
    pub role: String,
    /// Resource path, e.g. `/api/admin`.
    pub resource: String,
    /// Action, usually the HTTP method.
    pub action: String,
}

impl RuleConfig {
    fn new(role: &str, resource: &str, action: &str) -> Self {
        Self {
            role: role.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }
}

/// Policy engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Rules persisted and loaded when the rule table is empty at startup.
    #[serde(default = "default_bootstrap_rules")]
    pub bootstrap_rules: Vec<RuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bootstrap_rules: default_bootstrap_rules(),
        }
    }
}

fn default_bootstrap_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig::new("admin", "/api/admin", "GET"),
        RuleConfig::new("end_user_read_only", "/api/user", "GET"),
        RuleConfig::new("end_user_manager", "/api/user", "GET"),
        RuleConfig::new("admin", "/api/admin/policies", "GET"),
        RuleConfig::new("admin", "/api/admin/policies", "POST"),
        RuleConfig::new("admin", "/api/admin/policies", "DELETE"),
        RuleConfig::new("admin", "/api/admin/policies/reload", "POST"),
        RuleConfig::new("admin", "/api/admin/tokens/revoke", "POST"),
    ]
}
