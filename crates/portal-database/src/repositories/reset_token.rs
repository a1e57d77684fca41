//! Reset credential repository.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::reset::{CreateResetCredential, ResetCredential};

use crate::connection::DatabasePool;
use crate::deadline::with_deadline;

/// Storage for single-use password-reset rows.
#[async_trait]
pub trait ResetTokenRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new reset row.
    async fn create(&self, data: &CreateResetCredential) -> AppResult<ResetCredential>;

    /// Find the row matching both the token string and its owner.
    async fn find(&self, token: &str, user_id: i64) -> AppResult<Option<ResetCredential>>;

    /// Atomically mark an unclaimed row as held by one confirm.
    ///
    /// Returns `false` when the row is gone or another confirm holds it.
    async fn claim(&self, id: i64, now: DateTime<Utc>) -> AppResult<bool>;

    /// Drop a claim so the row can be used again.
    async fn release(&self, id: i64) -> AppResult<()>;

    /// Delete a row by id. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Delete every row with `expires_at <= now`. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed [`ResetTokenRepository`].
#[derive(Debug, Clone)]
pub struct PgResetTokenRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgResetTokenRepository {
    /// Create a new reset credential repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
            query_timeout: db.query_timeout(),
        }
    }
}

#[async_trait]
impl ResetTokenRepository for PgResetTokenRepository {
    async fn create(&self, data: &CreateResetCredential) -> AppResult<ResetCredential> {
        with_deadline(self.query_timeout, "insert reset credential", async {
            sqlx::query_as::<_, ResetCredential>(
                "INSERT INTO reset_credentials (user_id, token, expires_at) \
                 VALUES ($1, $2, $3) \
                 RETURNING *",
            )
            .bind(data.user_id)
            .bind(&data.token)
            .bind(data.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to store reset credential", e)
            })
        })
        .await
    }

    async fn find(&self, token: &str, user_id: i64) -> AppResult<Option<ResetCredential>> {
        with_deadline(self.query_timeout, "find reset credential", async {
            sqlx::query_as::<_, ResetCredential>(
                "SELECT * FROM reset_credentials WHERE token = $1 AND user_id = $2",
            )
            .bind(token)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find reset credential", e)
            })
        })
        .await
    }

    async fn claim(&self, id: i64, now: DateTime<Utc>) -> AppResult<bool> {
        let result = with_deadline(self.query_timeout, "claim reset credential", async {
            sqlx::query(
                "UPDATE reset_credentials SET claimed_at = $2 \
                 WHERE id = $1 AND claimed_at IS NULL",
            )
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to claim reset credential", e)
            })
        })
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, id: i64) -> AppResult<()> {
        with_deadline(self.query_timeout, "release reset credential", async {
            sqlx::query("UPDATE reset_credentials SET claimed_at = NULL WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to release reset credential",
                        e,
                    )
                })
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = with_deadline(self.query_timeout, "delete reset credential", async {
            sqlx::query("DELETE FROM reset_credentials WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to delete reset credential",
                        e,
                    )
                })
        })
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = with_deadline(self.query_timeout, "purge reset credentials", async {
            sqlx::query("DELETE FROM reset_credentials WHERE expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to purge expired reset credentials",
                        e,
                    )
                })
        })
        .await?;
        Ok(result.rows_affected())
    }
}
