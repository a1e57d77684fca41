//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in the default configuration.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token, hashing, and password-reset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Session token lifetime in minutes.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
    /// Password-reset token and row lifetime in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    /// Minimum length for new passwords.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4) for new passwords.
    #[serde(default = "default_password_score")]
    pub password_min_score: u8,
    /// Answer reset requests for unknown or inactive accounts exactly like
    /// real ones instead of returning 404.
    #[serde(default = "default_true")]
    pub conceal_unknown_reset_accounts: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            session_ttl_minutes: default_session_ttl(),
            reset_token_ttl_minutes: default_reset_ttl(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            password_min_length: default_password_min(),
            password_min_score: default_password_score(),
            conceal_unknown_reset_accounts: true,
        }
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60
}

fn default_reset_ttl() -> u64 {
    60
}

fn default_argon2_memory() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_password_min() -> usize {
    8
}

fn default_password_score() -> u8 {
    2
}

fn default_true() -> bool {
    true
}
