//! Log-only mailer for development.

use async_trait::async_trait;
use tracing::info;

use portal_core::result::AppResult;
use portal_core::traits::Mailer;

/// Accepts every message and writes its envelope to the log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        info!(
            to = %to,
            subject = %subject,
            body_len = html_body.len(),
            "Email delivery disabled; message logged instead"
        );
        Ok(())
    }
}
