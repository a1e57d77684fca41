//! Mailer doubles for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::Mailer;

/// A message captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Accepts every message and keeps a copy.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages accepted so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<SentEmail> {
        self.sent().pop()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: html_body.to_string(),
            });
        Ok(())
    }
}

/// Rejects every message as a provider failure.
#[derive(Debug, Default)]
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> AppResult<()> {
        Err(AppError::external("mail provider rejected the message"))
    }
}

/// Pull the `token` query parameter out of a reset email body.
pub fn extract_reset_token(html_body: &str) -> Option<String> {
    let start = html_body.find("token=")? + "token=".len();
    let rest = &html_body[start..];
    let end = rest.find(['"', '&', '<']).unwrap_or(rest.len());
    Some(rest[..end].to_string())
}
