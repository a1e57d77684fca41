//! Policy engine: answers "may role R perform action A on resource P?".

use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::repositories::PolicyRepository;
use portal_entity::policy::PolicyRule;

use super::policies::RuleSet;

/// Enforces role-based access control against a hot-swappable rule snapshot.
///
/// `load` builds a complete new [`RuleSet`] from the store before swapping
/// the shared pointer, so concurrent queries see either the old or the new
/// snapshot, never a mix. Every internal failure denies.
pub struct RbacEnforcer {
    /// Persistent rule store.
    repo: Arc<dyn PolicyRepository>,
    /// Current snapshot.
    rules: RwLock<Arc<RuleSet>>,
}

impl std::fmt::Debug for RbacEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbacEnforcer")
            .field("rules", &self.rule_count())
            .finish()
    }
}

impl RbacEnforcer {
    /// Creates an enforcer with an empty snapshot. Call [`load`](Self::load)
    /// before serving.
    pub fn new(repo: Arc<dyn PolicyRepository>) -> Self {
        Self {
            repo,
            rules: RwLock::new(Arc::new(RuleSet::default())),
        }
    }

    /// Startup path: seeds `bootstrap` into an empty store, then loads.
    ///
    /// Any store failure is returned; the caller must not serve without an
    /// engine.
    pub async fn initialize(
        repo: Arc<dyn PolicyRepository>,
        bootstrap: &[PolicyRule],
    ) -> AppResult<Self> {
        let enforcer = Self::new(repo);

        if enforcer.repo.count().await? == 0 {
            if bootstrap.is_empty() {
                warn!("Policy rule table is empty and no bootstrap rules are configured");
            } else {
                warn!(
                    rules = bootstrap.len(),
                    "Policy rule table is empty; seeding bootstrap rules"
                );
                for rule in bootstrap {
                    enforcer.repo.add(rule).await?;
                }
            }
        }

        enforcer.load().await?;
        Ok(enforcer)
    }

    /// Reloads the full rule set from the store and swaps it in.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn load(&self) -> AppResult<usize> {
        let rules = self.repo.list().await?;
        let snapshot = Arc::new(RuleSet::from_rules(rules));
        let count = snapshot.len();

        {
            let mut current = self
                .rules
                .write()
                .map_err(|_| AppError::internal("Policy snapshot lock poisoned"))?;
            *current = snapshot;
        }

        if count == 0 {
            warn!("Policy engine loaded zero rules; every protected route will be denied");
        } else {
            info!(rules = count, "Policy rules loaded");
        }
        Ok(count)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> AppResult<Arc<RuleSet>> {
        self.rules
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| AppError::internal("Policy snapshot lock poisoned"))
    }

    /// Membership test that surfaces engine errors.
    pub fn try_authorize(&self, role: &str, resource: &str, action: &str) -> AppResult<bool> {
        Ok(self.snapshot()?.allows(role, resource, action))
    }

    /// Membership test; engine errors deny.
    pub fn authorize(&self, role: &str, resource: &str, action: &str) -> bool {
        match self.try_authorize(role, resource, action) {
            Ok(allowed) => allowed,
            Err(e) => {
                error!(
                    role = %role,
                    resource = %resource,
                    action = %action,
                    error = %e,
                    "Policy check failed; denying"
                );
                false
            }
        }
    }

    /// Number of rules in the current snapshot (0 if unreadable).
    pub fn rule_count(&self) -> usize {
        self.snapshot().map(|s| s.len()).unwrap_or(0)
    }

    /// Persists a rule and reloads. Returns `false` if it already existed.
    pub async fn add_rule(&self, rule: &PolicyRule) -> AppResult<bool> {
        if !rule.is_complete() {
            return Err(AppError::validation("role, resource and action are required"));
        }
        let added = self.repo.add(rule).await?;
        self.load().await?;
        info!(
            role = %rule.role,
            resource = %rule.resource,
            action = %rule.action,
            added,
            "Policy rule added"
        );
        Ok(added)
    }

    /// Deletes a rule and reloads. Returns `false` if it was not present.
    pub async fn remove_rule(&self, rule: &PolicyRule) -> AppResult<bool> {
        let removed = self.repo.remove(rule).await?;
        self.load().await?;
        info!(
            role = %rule.role,
            resource = %rule.resource,
            action = %rule.action,
            removed,
            "Policy rule removed"
        );
        Ok(removed)
    }
}
