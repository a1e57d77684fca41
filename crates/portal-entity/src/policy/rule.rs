//! Policy rule entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use portal_core::config::policy::RuleConfig;

/// A `(role, resource, action)` permission triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, FromRow)]
pub struct PolicyRule {
    /// Role the permission is granted to.
    pub role: String,
    /// Resource path the permission covers, e.g. `/api/admin`.
    #[sqlx(rename = "resource_path")]
    pub resource: String,
    /// Permitted action, usually an upper-case HTTP method.
    pub action: String,
}

impl PolicyRule {
    /// Build a rule, trimming whitespace and upper-casing the action.
    pub fn new(
        role: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into().trim().to_string(),
            resource: resource.into().trim().to_string(),
            action: action.into().trim().to_uppercase(),
        }
    }

    /// Re-applies the trimming and upper-casing of [`PolicyRule::new`] to a
    /// rule that was built field by field, e.g. read back from the store.
    pub fn normalized(self) -> Self {
        Self::new(self.role, self.resource, self.action)
    }

    /// Whether every field is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.role.is_empty() && !self.resource.is_empty() && !self.action.is_empty()
    }
}

impl From<&RuleConfig> for PolicyRule {
    fn from(rule: &RuleConfig) -> Self {
        Self::new(rule.role.as_str(), rule.resource.as_str(), rule.action.as_str())
    }
}
