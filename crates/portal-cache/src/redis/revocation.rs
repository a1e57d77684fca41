//! Redis-backed revocation cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::traits::TokenRevocationCache;

use super::client::RedisClient;
use crate::keys;

/// Revocation cache storing live-token markers as Redis keys with `EX` TTLs.
///
/// Redis expires keys itself, so passive expiry needs no extra bookkeeping.
#[derive(Debug, Clone)]
pub struct RedisRevocationCache {
    client: RedisClient,
}

impl RedisRevocationCache {
    /// Create a new Redis revocation cache.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl TokenRevocationCache for RedisRevocationCache {
    async fn register(&self, token: &str, ttl: Duration) -> AppResult<()> {
        let key = self.client.prefixed_key(&keys::live_token(token));
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .set_ex(&key, 1u8, ttl.as_secs().max(1))
            .await
            .map_err(Self::map_err)?;
        debug!(
            token = %keys::token_fingerprint(token),
            ttl_secs = ttl.as_secs(),
            "Token registered"
        );
        Ok(())
    }

    async fn is_live(&self, token: &str) -> AppResult<bool> {
        let key = self.client.prefixed_key(&keys::live_token(token));
        let mut conn = self.client.conn_mut();
        conn.exists(&key).await.map_err(Self::map_err)
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        let key = self.client.prefixed_key(&keys::live_token(token));
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn evict_expired(&self) -> AppResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
