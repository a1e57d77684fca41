//! Token bucket rate limiter middleware.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tracing::warn;

use portal_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// In-memory token bucket rate limiter keyed by client address.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Client → bucket state.
    buckets: Arc<DashMap<String, TokenBucket>>,
    /// Maximum tokens per bucket.
    capacity: f64,
    /// Token refill rate per second.
    refill_rate: f64,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a rate limiter with `capacity` tokens refilled at
    /// `refill_rate` tokens per second.
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            capacity: f64::from(capacity),
            refill_rate,
        }
    }

    /// A limiter allowing `limit` requests per minute, or `None` when
    /// `limit` is zero.
    pub fn per_minute(limit: u32) -> Option<Self> {
        (limit > 0).then(|| Self::new(limit, f64::from(limit) / 60.0))
    }

    /// Attempts to consume a token for the given key.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket {
                tokens: self.capacity,
                last_refill: now,
            });

        // Refill tokens
        let elapsed = now
            .saturating_duration_since(bucket.last_refill)
            .as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drops buckets untouched for longer than `idle`.
    pub fn prune(&self, idle: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < idle);
        before - self.buckets.len()
    }
}

/// Client key: the socket peer when known, else the first forwarded hop.
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rejects requests over the per-client limit with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let key = client_key(&request);
        if !limiter.check(&key) {
            warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
            return ApiError(AppError::rate_limited("too many requests")).into_response();
        }
    }

    next.run(request).await
}
