//! In-memory revocation cache implementation using the moka crate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::{Clock, TokenRevocationCache};

use crate::keys;

/// A live-token marker.
#[derive(Debug, Clone)]
struct LiveEntry {
    /// Instant (on the injected clock) the entry stops counting as live.
    expires_at: DateTime<Utc>,
    /// TTL handed to moka for physical eviction.
    ttl: Duration,
}

/// Per-entry TTL policy: each entry lives for the TTL it was registered with.
struct EntryTtl;

impl Expiry<String, LiveEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &LiveEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &LiveEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory revocation cache using moka.
///
/// moka evicts entries on its own wall-clock schedule; liveness is
/// additionally checked against the injected [`Clock`], so an entry past
/// its TTL reads as absent even before eviction runs.
#[derive(Clone)]
pub struct MemoryRevocationCache {
    /// The underlying moka cache.
    cache: Cache<String, LiveEntry>,
    /// Time source for passive expiry.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MemoryRevocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRevocationCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryRevocationCache {
    /// Create a new in-memory cache holding at most `max_capacity` tokens.
    pub fn new(max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache, clock }
    }
}

#[async_trait]
impl TokenRevocationCache for MemoryRevocationCache {
    async fn register(&self, token: &str, ttl: Duration) -> AppResult<()> {
        let span = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::cache(format!("Invalid cache TTL: {e}")))?;
        let entry = LiveEntry {
            expires_at: self.clock.now() + span,
            ttl,
        };
        self.cache.insert(keys::live_token(token), entry).await;
        Ok(())
    }

    async fn is_live(&self, token: &str) -> AppResult<bool> {
        let live = match self.cache.get(&keys::live_token(token)).await {
            Some(entry) => self.clock.now() < entry.expires_at,
            None => false,
        };
        Ok(live)
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.cache.invalidate(&keys::live_token(token)).await;
        Ok(())
    }

    async fn evict_expired(&self) -> AppResult<u64> {
        let now = self.clock.now();
        let stale: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(_, entry)| now >= entry.expires_at)
            .map(|(key, _)| key)
            .collect();

        for key in &stale {
            self.cache.invalidate(key.as_str()).await;
        }
        self.cache.run_pending_tasks().await;

        debug!(
            evicted = stale.len(),
            remaining = self.cache.entry_count(),
            "Revocation cache swept"
        );
        Ok(stale.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
