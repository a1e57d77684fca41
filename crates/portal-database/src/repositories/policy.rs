//! Policy rule repository.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::policy::PolicyRule;

use crate::connection::DatabasePool;
use crate::deadline::with_deadline;

/// Persistent storage for `(role, resource, action)` rules.
#[async_trait]
pub trait PolicyRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Load every stored rule.
    async fn list(&self) -> AppResult<Vec<PolicyRule>>;

    /// Insert a rule. Returns `false` if it was already present.
    async fn add(&self, rule: &PolicyRule) -> AppResult<bool>;

    /// Remove a rule. Returns `false` if it was not present.
    async fn remove(&self, rule: &PolicyRule) -> AppResult<bool>;

    /// Number of stored rules.
    async fn count(&self) -> AppResult<u64>;
}

/// PostgreSQL-backed [`PolicyRepository`].
#[derive(Debug, Clone)]
pub struct PgPolicyRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgPolicyRepository {
    /// Create a new policy repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
            query_timeout: db.query_timeout(),
        }
    }
}

#[async_trait]
impl PolicyRepository for PgPolicyRepository {
    async fn list(&self) -> AppResult<Vec<PolicyRule>> {
        with_deadline(self.query_timeout, "list policy rules", async {
            sqlx::query_as::<_, PolicyRule>(
                "SELECT role, resource_path, action FROM policy_rules \
                 ORDER BY role, resource_path, action",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load policy rules", e))
        })
        .await
    }

    async fn add(&self, rule: &PolicyRule) -> AppResult<bool> {
        let result = with_deadline(self.query_timeout, "insert policy rule", async {
            sqlx::query(
                "INSERT INTO policy_rules (role, resource_path, action) VALUES ($1, $2, $3) \
                 ON CONFLICT (role, resource_path, action) DO NOTHING",
            )
            .bind(&rule.role)
            .bind(&rule.resource)
            .bind(&rule.action)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add policy rule", e))
        })
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, rule: &PolicyRule) -> AppResult<bool> {
        let result = with_deadline(self.query_timeout, "delete policy rule", async {
            sqlx::query(
                "DELETE FROM policy_rules WHERE role = $1 AND resource_path = $2 AND action = $3",
            )
            .bind(&rule.role)
            .bind(&rule.resource)
            .bind(&rule.action)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove policy rule", e)
            })
        })
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = with_deadline(self.query_timeout, "count policy rules", async {
            sqlx::query_scalar("SELECT COUNT(*) FROM policy_rules")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count policy rules", e)
                })
        })
        .await?;
        Ok(total as u64)
    }
}
