//! Mailer selection from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use portal_core::config::email::EmailConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::Mailer;

use crate::log::LogMailer;
use crate::sendgrid::SendGridMailer;

/// Build the mailer named by `config.provider`.
pub fn build_mailer(config: &EmailConfig) -> AppResult<Arc<dyn Mailer>> {
    match config.provider.as_str() {
        "sendgrid" => {
            info!(sender = %config.sender_email, "Initializing SendGrid mailer");
            Ok(Arc::new(SendGridMailer::new(config)?))
        }
        "log" => {
            warn!("Email provider is 'log'; reset emails will not be delivered");
            Ok(Arc::new(LogMailer))
        }
        other => Err(AppError::configuration(format!(
            "Unknown email provider: '{other}'. Supported: sendgrid, log"
        ))),
    }
}
