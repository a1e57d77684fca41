//! Authorization policy entities.

pub mod rule;

pub use rule::PolicyRule;
