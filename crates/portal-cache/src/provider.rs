//! Revocation cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use portal_core::config::cache::CacheConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::{Clock, TokenRevocationCache};

/// Wraps the configured revocation cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct RevocationCacheManager {
    /// The inner cache provider.
    inner: Arc<dyn TokenRevocationCache>,
}

impl RevocationCacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let inner: Arc<dyn TokenRevocationCache> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis revocation cache");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisRevocationCache::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!(
                    max_capacity = config.max_capacity,
                    "Initializing in-memory revocation cache"
                );
                Arc::new(crate::memory::MemoryRevocationCache::new(
                    config.max_capacity,
                    clock,
                ))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }
}

#[async_trait]
impl TokenRevocationCache for RevocationCacheManager {
    async fn register(&self, token: &str, ttl: Duration) -> AppResult<()> {
        self.inner.register(token, ttl).await
    }

    async fn is_live(&self, token: &str) -> AppResult<bool> {
        self.inner.is_live(token).await
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.inner.revoke(token).await
    }

    async fn evict_expired(&self) -> AppResult<u64> {
        self.inner.evict_expired().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::traits::SystemClock;

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let config = CacheConfig::default();
        let manager = RevocationCacheManager::new(&config, Arc::new(SystemClock))
            .await
            .unwrap();

        manager
            .register("tok", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(manager.is_live("tok").await.unwrap());
        assert!(manager.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = CacheConfig {
            provider: "memcached".to_string(),
            ..CacheConfig::default()
        };
        let err = RevocationCacheManager::new(&config, Arc::new(SystemClock))
            .await
            .unwrap_err();
        assert_eq!(err.kind, portal_core::error::ErrorKind::Configuration);
    }
}
