//! Outbound email delivery.

use async_trait::async_trait;

use crate::result::AppResult;

/// Delivers a single HTML email.
///
/// Returns `Ok(())` only once the provider has accepted the message; any
/// transport or provider rejection is an `ExternalService` error.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug + 'static {
    /// Send `html_body` to `to` with the given subject.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()>;
}
