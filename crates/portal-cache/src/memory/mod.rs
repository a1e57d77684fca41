//! In-memory revocation cache backed by moka.

pub mod store;

pub use store::MemoryRevocationCache;
