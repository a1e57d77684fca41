//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate and overridden by `PORTAL__`-prefixed environment
//! variables. Each sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod email;
pub mod logging;
pub mod policy;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::{AuthConfig, PLACEHOLDER_JWT_SECRET};
use self::cache::CacheConfig;
use self::database::DatabaseConfig;
use self::email::EmailConfig;
use self::logging::LoggingConfig;
use self::policy::PolicyConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Revocation cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token, hashing, and reset settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Outbound email settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// Authorization policy settings.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config/default.toml` plus the overlay for `env`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration from an explicit base file.
    ///
    /// The environment overlay is looked up next to the base file, and
    /// environment variables prefixed with `PORTAL__` win over both.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = Path::new(base)
            .parent()
            .map(|dir| dir.join(env))
            .unwrap_or_else(|| Path::new(env).to_path_buf());

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::from(overlay).required(false))
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate(env)?;
        Ok(loaded)
    }

    /// Reject configurations the service cannot safely start with.
    pub fn validate(&self, env: &str) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if env != "development" && self.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be changed outside development (env '{env}')"
            )));
        }
        if self.auth.session_ttl_minutes == 0 || self.auth.reset_token_ttl_minutes == 0 {
            return Err(AppError::configuration("token lifetimes must be positive"));
        }
        if self.cache.token_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "cache.token_ttl_seconds must be positive",
            ));
        }

        match self.cache.provider.as_str() {
            "memory" | "redis" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "unknown cache provider '{other}'"
                )));
            }
        }

        match self.email.provider.as_str() {
            "log" => {}
            "sendgrid" => {
                if self.email.sendgrid_api_key.trim().is_empty() {
                    return Err(AppError::configuration(
                        "email.sendgrid_api_key is required for the sendgrid provider",
                    ));
                }
            }
            other => {
                return Err(AppError::configuration(format!(
                    "unknown email provider '{other}'"
                )));
            }
        }

        Ok(())
    }
}
