//! SendGrid v3 mail delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use portal_core::config::email::EmailConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::traits::Mailer;

#[derive(Debug, Serialize)]
struct SendGridEmail<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendGridErrors {
    errors: Vec<SendGridError>,
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    message: String,
}

/// Mailer posting to the SendGrid v3 `mail/send` endpoint.
#[derive(Clone)]
pub struct SendGridMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl std::fmt::Debug for SendGridMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridMailer")
            .field("endpoint", &self.endpoint)
            .field("sender_email", &self.sender_email)
            .finish()
    }
}

impl SendGridMailer {
    /// Create a mailer from configuration.
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        if config.sendgrid_api_key.trim().is_empty() {
            return Err(AppError::configuration("SendGrid API key is not set"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to create HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            endpoint: config.sendgrid_endpoint.clone(),
            api_key: config.sendgrid_api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
        })
    }

    fn build_headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| AppError::configuration(format!("Invalid API key format: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    fn build_payload<'a>(
        &'a self,
        to: &'a str,
        subject: &'a str,
        html_body: &'a str,
    ) -> SendGridEmail<'a> {
        SendGridEmail {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: to,
                    name: None,
                }],
            }],
            from: EmailAddress {
                email: &self.sender_email,
                name: Some(&self.sender_name),
            },
            subject,
            content: vec![Content {
                content_type: "text/html",
                value: html_body,
            }],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        debug!(to = %to, "Sending email via SendGrid");

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&self.build_payload(to, subject, html_body))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "SendGrid request failed", e)
            })?;

        let status = response.status();
        if status.is_success() {
            info!(to = %to, sender = %self.sender_email, "Email accepted by SendGrid");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<SendGridErrors>(&body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; "),
            _ => body,
        };

        error!(status = %status, detail = %detail, "SendGrid rejected email");
        Err(AppError::external(format!(
            "SendGrid rejected email with status {status}: {detail}"
        )))
    }
}
