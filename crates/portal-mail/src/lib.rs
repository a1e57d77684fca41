//! # portal-mail
//!
//! [`Mailer`](portal_core::traits::Mailer) implementations and the
//! password-reset email template.
//!
//! - `sendgrid`: delivery through the SendGrid v3 HTTP API
//! - `log`: writes messages to the log instead of sending them (development)
//! - `testing`: recording and failing doubles for tests

pub mod log;
pub mod provider;
pub mod sendgrid;
pub mod template;
pub mod testing;

pub use provider::build_mailer;
pub use template::ResetEmail;
