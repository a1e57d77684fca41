//! Server-side liveness registry for issued session tokens.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Registry of live session tokens.
///
/// A token is usable only while it has an unexpired entry here, which lets
/// the server invalidate signed tokens before their embedded expiry.
/// Implementations must treat an entry past its TTL as absent even if it has
/// not been physically evicted yet.
#[async_trait]
pub trait TokenRevocationCache: Send + Sync + std::fmt::Debug + 'static {
    /// Mark `token` live for `ttl`. Re-registering resets the TTL.
    async fn register(&self, token: &str, ttl: Duration) -> AppResult<()>;

    /// Whether `token` has an unexpired entry.
    async fn is_live(&self, token: &str) -> AppResult<bool>;

    /// Remove the entry for `token` immediately. Removing an absent token is
    /// not an error.
    async fn revoke(&self, token: &str) -> AppResult<()>;

    /// Physically drop expired entries. Returns how many were dropped by this
    /// call; backends that expire keys on their own may report zero.
    async fn evict_expired(&self) -> AppResult<u64>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
