//! In-memory identity store.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_entity::identity::{CreateIdentity, Identity, IdentityStatus};

use super::unavailable;
use crate::repositories::IdentityRepository;

/// [`IdentityRepository`] over a `Vec` guarded by an async lock.
#[derive(Debug, Default)]
pub struct MemoryIdentityRepository {
    rows: RwLock<Vec<Identity>>,
    next_id: AtomicI64,
    fail_password_updates: AtomicBool,
}

impl MemoryIdentityRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `update_password` call fail with a `Database` error.
    pub fn fail_password_updates(&self, fail: bool) {
        self.fail_password_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityRepository for MemoryIdentityRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Identity>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|i| i.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Identity>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|i| i.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Identity>> {
        Ok(self.rows.read().await.clone())
    }

    async fn create(&self, data: &CreateIdentity) -> AppResult<Identity> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|i| i.username == data.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let now = Utc::now();
        let identity = Identity {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            roles: data.roles.clone(),
            status: data.status,
            created_at: now,
            updated_at: now,
        };
        rows.push(identity.clone());
        Ok(identity)
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.fail_password_updates.load(Ordering::SeqCst) {
            return Err(unavailable("update password"));
        }

        let mut rows = self.rows.write().await;
        let identity = rows
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        identity.password_hash = password_hash.to_string();
        identity.updated_at = updated_at;
        Ok(())
    }

    async fn update_status(&self, id: i64, status: IdentityStatus) -> AppResult<Identity> {
        let mut rows = self.rows.write().await;
        let identity = rows
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))?;
        identity.status = status;
        identity.updated_at = Utc::now();
        Ok(identity.clone())
    }
}
