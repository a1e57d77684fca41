//! Periodic purge of expired reset rows and stale cache entries.

use std::sync::Arc;

use tracing::{error, info};

use portal_core::result::AppResult;
use portal_core::traits::{Clock, TokenRevocationCache};
use portal_database::repositories::ResetTokenRepository;

/// Counts from one housekeeping cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Reset rows deleted because they were past expiry.
    pub reset_rows: u64,
    /// Cache entries dropped because their TTL had elapsed.
    pub cache_entries: u64,
}

/// Handles periodic housekeeping of expired auth state.
#[derive(Clone)]
pub struct ResetCleanup {
    resets: Arc<dyn ResetTokenRepository>,
    cache: Arc<dyn TokenRevocationCache>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResetCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetCleanup").finish()
    }
}

impl ResetCleanup {
    /// Creates a new cleanup handler.
    pub fn new(
        resets: Arc<dyn ResetTokenRepository>,
        cache: Arc<dyn TokenRevocationCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resets,
            cache,
            clock,
        }
    }

    /// Runs one cycle.
    ///
    /// A cache failure does not stop the row purge; a row purge failure is
    /// returned after the cache has been swept.
    pub async fn run_cleanup(&self) -> AppResult<CleanupReport> {
        let mut report = CleanupReport::default();

        match self.cache.evict_expired().await {
            Ok(n) => report.cache_entries = n,
            Err(e) => error!(error = %e.detailed(), "Failed to evict expired cache entries"),
        }

        report.reset_rows = self.resets.delete_expired(self.clock.now()).await?;

        if report.reset_rows > 0 || report.cache_entries > 0 {
            info!(
                reset_rows = report.reset_rows,
                cache_entries = report.cache_entries,
                "Auth cleanup completed"
            );
        }

        Ok(report)
    }
}
