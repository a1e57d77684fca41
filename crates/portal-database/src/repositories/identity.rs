//! Identity repository.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::identity::{CreateIdentity, Identity, IdentityStatus};

use crate::connection::DatabasePool;
use crate::deadline::with_deadline;

/// Point queries and writes against stored identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an identity by exact (case-sensitive) username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Identity>>;

    /// Find an identity by primary key.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Identity>>;

    /// List all identities ordered by id.
    async fn list(&self) -> AppResult<Vec<Identity>>;

    /// Create a new identity. Duplicate usernames are a `Conflict`.
    async fn create(&self, data: &CreateIdentity) -> AppResult<Identity>;

    /// Replace the password hash and bump `updated_at`.
    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Change the account status.
    async fn update_status(&self, id: i64, status: IdentityStatus) -> AppResult<Identity>;
}

/// PostgreSQL-backed [`IdentityRepository`].
#[derive(Debug, Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgIdentityRepository {
    /// Create a new identity repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
            query_timeout: db.query_timeout(),
        }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Identity>> {
        with_deadline(self.query_timeout, "find identity by username", async {
            sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to find identity by username",
                        e,
                    )
                })
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Identity>> {
        with_deadline(self.query_timeout, "find identity by id", async {
            sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find identity by id", e)
                })
        })
        .await
    }

    async fn list(&self) -> AppResult<Vec<Identity>> {
        with_deadline(self.query_timeout, "list identities", async {
            sqlx::query_as::<_, Identity>("SELECT * FROM identities ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to list identities", e)
                })
        })
        .await
    }

    async fn create(&self, data: &CreateIdentity) -> AppResult<Identity> {
        with_deadline(self.query_timeout, "create identity", async {
            sqlx::query_as::<_, Identity>(
                "INSERT INTO identities (username, email, password_hash, roles, status) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING *",
            )
            .bind(&data.username)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(&data.roles)
            .bind(data.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("identities_username_key") =>
                {
                    AppError::conflict(format!("Username '{}' already exists", data.username))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to create identity", e),
            })
        })
        .await
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = with_deadline(self.query_timeout, "update password", async {
            sqlx::query("UPDATE identities SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .bind(updated_at)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })
        })
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Identity {id} not found")));
        }
        Ok(())
    }

    async fn update_status(&self, id: i64, status: IdentityStatus) -> AppResult<Identity> {
        with_deadline(self.query_timeout, "update identity status", async {
            sqlx::query_as::<_, Identity>(
                "UPDATE identities SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update status", e))?
            .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
        })
        .await
    }
}
