//! Cache key builders.
//!
//! Raw tokens never become cache keys; they are reduced to a SHA-256 digest
//! first so that a cache dump does not leak usable credentials.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a token.
pub fn token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Cache key marking a session token as live.
pub fn live_token(token: &str) -> String {
    format!("token:live:{}", token_hash(token))
}

/// Short, non-reversible token identifier for log lines.
pub fn token_fingerprint(token: &str) -> String {
    token_hash(token)[..12].to_string()
}
