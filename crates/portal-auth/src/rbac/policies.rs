//! Immutable rule snapshots.

use std::collections::{HashMap, HashSet};

use portal_entity::policy::PolicyRule;

/// An immutable set of `(role, resource, action)` rules indexed for lookup.
///
/// Snapshots are never mutated after construction; reloads build a new one
/// and swap it in.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// role → resource → actions
    index: HashMap<String, HashMap<String, HashSet<String>>>,
    len: usize,
}

impl RuleSet {
    /// Build a snapshot from normalized rules, dropping duplicates and
    /// incomplete rules.
    pub fn from_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = PolicyRule>,
    {
        let mut set = Self::default();
        for rule in rules.into_iter().map(PolicyRule::normalized) {
            if !rule.is_complete() {
                continue;
            }
            let inserted = set
                .index
                .entry(rule.role)
                .or_default()
                .entry(rule.resource)
                .or_default()
                .insert(rule.action);
            if inserted {
                set.len += 1;
            }
        }
        set
    }

    /// Exact-match membership test.
    pub fn allows(&self, role: &str, resource: &str, action: &str) -> bool {
        self.index
            .get(role)
            .and_then(|resources| resources.get(resource))
            .is_some_and(|actions| actions.contains(action))
    }

    /// Number of distinct rules.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the snapshot holds no rules.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All rules, sorted.
    pub fn rules(&self) -> Vec<PolicyRule> {
        let mut out: Vec<PolicyRule> = self
            .index
            .iter()
            .flat_map(|(role, resources)| {
                resources.iter().flat_map(move |(resource, actions)| {
                    actions
                        .iter()
                        .map(move |action| {
                            PolicyRule::new(role.as_str(), resource.as_str(), action.as_str())
                        })
                })
            })
            .collect();
        out.sort();
        out
    }
}
