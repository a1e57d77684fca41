//! In-memory policy rule store.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use portal_core::result::AppResult;
use portal_entity::policy::PolicyRule;

use super::unavailable;
use crate::repositories::PolicyRepository;

/// [`PolicyRepository`] over an ordered set.
#[derive(Debug, Default)]
pub struct MemoryPolicyRepository {
    rules: RwLock<BTreeSet<PolicyRule>>,
    unavailable: AtomicBool,
}

impl MemoryPolicyRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `rules`.
    pub fn with_rules(rules: impl IntoIterator<Item = PolicyRule>) -> Self {
        Self {
            rules: RwLock::new(rules.into_iter().collect()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every call fail with a `Database` error.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self, operation: &str) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyRepository for MemoryPolicyRepository {
    async fn list(&self) -> AppResult<Vec<PolicyRule>> {
        self.check("list policy rules")?;
        Ok(self.rules.read().await.iter().cloned().collect())
    }

    async fn add(&self, rule: &PolicyRule) -> AppResult<bool> {
        self.check("insert policy rule")?;
        Ok(self.rules.write().await.insert(rule.clone()))
    }

    async fn remove(&self, rule: &PolicyRule) -> AppResult<bool> {
        self.check("delete policy rule")?;
        Ok(self.rules.write().await.remove(rule))
    }

    async fn count(&self) -> AppResult<u64> {
        self.check("count policy rules")?;
        Ok(self.rules.read().await.len() as u64)
    }
}
