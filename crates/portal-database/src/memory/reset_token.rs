//! In-memory reset credential store.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use portal_core::result::AppResult;
use portal_entity::reset::{CreateResetCredential, ResetCredential};

use super::unavailable;
use crate::repositories::ResetTokenRepository;

/// [`ResetTokenRepository`] over a `Vec` guarded by an async lock.
#[derive(Debug, Default)]
pub struct MemoryResetTokenRepository {
    rows: RwLock<Vec<ResetCredential>>,
    next_id: AtomicI64,
    fail_inserts: AtomicBool,
    fail_deletes: AtomicBool,
    delete_attempts: AtomicUsize,
}

impl MemoryResetTokenRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create` call fail with a `Database` error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make every `delete` call fail with a `Database` error.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of `delete` calls seen, failed ones included.
    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of all stored rows.
    pub async fn rows(&self) -> Vec<ResetCredential> {
        self.rows.read().await.clone()
    }

    /// Overwrite a row's expiry, for driving expiry paths in tests.
    pub async fn set_expires_at(&self, id: i64, expires_at: DateTime<Utc>) -> bool {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ResetTokenRepository for MemoryResetTokenRepository {
    async fn create(&self, data: &CreateResetCredential) -> AppResult<ResetCredential> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(unavailable("insert reset credential"));
        }

        let row = ResetCredential {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: data.user_id,
            token: data.token.clone(),
            expires_at: data.expires_at,
            claimed_at: None,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn find(&self, token: &str, user_id: i64) -> AppResult<Option<ResetCredential>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|r| r.token == token && r.user_id == user_id)
            .cloned())
    }

    async fn claim(&self, id: i64, now: DateTime<Utc>) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) if row.claimed_at.is_none() => {
                row.claimed_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, id: i64) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.claimed_at = None;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(unavailable("delete reset credential"));
        }

        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| !r.is_expired_at(now));
        Ok((before - rows.len()) as u64)
    }
}
