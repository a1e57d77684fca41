//! Redis revocation cache backend.

pub mod client;
pub mod revocation;

pub use client::RedisClient;
pub use revocation::RedisRevocationCache;
