//! Identity account status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account status for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "identity_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    /// Account is active and can log in.
    Active,
    /// Account is deactivated.
    Inactive,
    /// Account is suspended by an administrator.
    Suspended,
}

impl IdentityStatus {
    /// Check if an identity with this status may log in or reset its password.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IdentityStatus {
    type Err = portal_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(portal_core::AppError::validation(format!(
                "Invalid identity status: '{s}'. Expected one of: active, inactive, suspended"
            ))),
        }
    }
}
