//! Outbound email configuration.

use serde::{Deserialize, Serialize};

/// Email delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Delivery provider: `"sendgrid"` or `"log"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// SendGrid API key.
    #[serde(default)]
    pub sendgrid_api_key: String,
    /// SendGrid v3 send endpoint.
    #[serde(default = "default_endpoint")]
    pub sendgrid_endpoint: String,
    /// Sender address.
    #[serde(default = "default_sender_email")]
    pub sender_email: String,
    /// Sender display name.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Base URL of the reset page; the token is appended as `?token=`.
    #[serde(default = "default_reset_link_base")]
    pub reset_link_base: String,
    /// HTTP timeout for the provider call, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            sendgrid_api_key: String::new(),
            sendgrid_endpoint: default_endpoint(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            reset_link_base: default_reset_link_base(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    "log".to_string()
}

fn default_endpoint() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_sender_email() -> String {
    "no-reply@example.com".to_string()
}

fn default_sender_name() -> String {
    "Web Portal".to_string()
}

fn default_reset_link_base() -> String {
    "http://localhost:8080/reset".to_string()
}

fn default_timeout() -> u64 {
    10
}
