//! Role-based access control: role → resource path → action.

pub mod enforcer;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use policies::RuleSet;
