//! Revocation cache configuration.

use serde::{Deserialize, Serialize};

/// Token revocation cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// How long an issued token stays live in the cache, in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Maximum number of live tokens kept by the in-memory provider.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Interval between housekeeping passes, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            token_ttl_seconds: default_token_ttl(),
            max_capacity: default_max_capacity(),
            cleanup_interval_seconds: default_cleanup_interval(),
            redis: RedisCacheConfig::default(),
        }
    }
}

/// Redis cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all portal cache keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_token_ttl() -> u64 {
    24 * 60 * 60
}

fn default_max_capacity() -> u64 {
    100_000
}

fn default_cleanup_interval() -> u64 {
    300
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "portal:".to_string()
}
