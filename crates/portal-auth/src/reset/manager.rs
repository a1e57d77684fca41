//! Password-reset request and confirm flows.

use std::sync::Arc;

use tracing::{error, info, warn};

use portal_cache::keys::token_fingerprint;
use portal_core::config::AppConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::traits::{Clock, Mailer};
use portal_database::repositories::{IdentityRepository, ResetTokenRepository};
use portal_entity::identity::Identity;
use portal_entity::reset::CreateResetCredential;
use portal_mail::ResetEmail;

use crate::jwt::decoder::INVALID_TOKEN;
use crate::jwt::{JwtDecoder, JwtEncoder};
use crate::password::{PasswordHasher, PasswordValidator};

/// Rejection when the reset row is present but past its expiry.
pub const TOKEN_EXPIRED: &str = "token expired";
/// Rejection for unknown or inactive accounts when not concealed.
pub const USER_NOT_FOUND: &str = "user not found or inactive";

/// How a reset request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    /// A reset email was accepted by the mail provider.
    Sent,
    /// No eligible account; nothing was sent but the caller is not told.
    Concealed,
}

/// Settings for the reset flows, taken from [`AppConfig`].
#[derive(Debug, Clone)]
struct ResetSettings {
    conceal_unknown: bool,
    link_base: String,
    sender_name: String,
    ttl_minutes: u64,
}

/// Issues, mails, and consumes password-reset credentials.
#[derive(Clone)]
pub struct PasswordResetManager {
    identities: Arc<dyn IdentityRepository>,
    resets: Arc<dyn ResetTokenRepository>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    settings: ResetSettings,
}

impl std::fmt::Debug for PasswordResetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordResetManager")
            .field("settings", &self.settings)
            .finish()
    }
}

impl PasswordResetManager {
    /// Creates a reset manager.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &AppConfig,
        identities: Arc<dyn IdentityRepository>,
        resets: Arc<dyn ResetTokenRepository>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        hasher: Arc<PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            resets,
            encoder,
            decoder,
            hasher,
            validator: PasswordValidator::new(&config.auth),
            mailer,
            clock,
            settings: ResetSettings {
                conceal_unknown: config.auth.conceal_unknown_reset_accounts,
                link_base: config.email.reset_link_base.clone(),
                sender_name: config.email.sender_name.clone(),
                ttl_minutes: config.auth.reset_token_ttl_minutes,
            },
        }
    }

    /// Reset-request flow: active-account lookup, token issue, row insert,
    /// email delivery.
    ///
    /// The request is complete only once the mail provider accepts the
    /// message; a delivery failure is returned to the caller.
    pub async fn request_reset(&self, username: &str) -> AppResult<ResetRequestOutcome> {
        let eligible = self
            .identities
            .find_by_username(username)
            .await?
            .filter(Identity::can_login);

        let (identity, recipient) = match eligible {
            Some(identity) => match identity.reset_recipient().map(str::to_string) {
                Some(recipient) => (identity, recipient),
                None => {
                    warn!(
                        user_id = identity.id,
                        "Reset requested for identity with no email address"
                    );
                    return self.reject_unknown(username);
                }
            },
            None => return self.reject_unknown(username),
        };

        let issued = self.encoder.issue_reset(&identity)?;
        let row = self
            .resets
            .create(&CreateResetCredential {
                user_id: identity.id,
                token: issued.token.clone(),
                expires_at: self.clock.now() + self.encoder.reset_ttl(),
            })
            .await?;

        let email = ResetEmail {
            link_base: &self.settings.link_base,
            token: &issued.token,
            ttl_minutes: self.settings.ttl_minutes,
            sender_name: &self.settings.sender_name,
        };

        if let Err(e) = self
            .mailer
            .send(&recipient, email.subject(), &email.html())
            .await
        {
            error!(
                user_id = identity.id,
                error = %e.detailed(),
                "Failed to send reset email"
            );
            if let Err(cleanup) = self.resets.delete(row.id).await {
                warn!(
                    row_id = row.id,
                    error = %cleanup,
                    "Failed to drop undelivered reset row"
                );
            }
            return Err(AppError::with_source(
                ErrorKind::ExternalService,
                "failed to send reset email",
                e,
            ));
        }

        info!(
            user_id = identity.id,
            token = %token_fingerprint(&issued.token),
            "Password reset email sent"
        );
        Ok(ResetRequestOutcome::Sent)
    }

    fn reject_unknown(&self, username: &str) -> AppResult<ResetRequestOutcome> {
        warn!(
            username = %username,
            "Password reset requested for unknown or inactive account"
        );
        if self.settings.conceal_unknown {
            Ok(ResetRequestOutcome::Concealed)
        } else {
            Err(AppError::not_found(USER_NOT_FOUND))
        }
    }

    /// Reset-confirm flow.
    ///
    /// The row is claimed before the password update so that concurrent
    /// confirms with one token cannot both succeed. It is deleted only after
    /// the update succeeds; a failed update releases the claim and leaves the
    /// token usable for a retry. A failed delete after a successful update is
    /// logged and otherwise ignored, and the row stays claimed until cleanup.
    pub async fn confirm_reset(&self, token: &str, new_password: &str) -> AppResult<()> {
        let claims = self.decoder.decode_reset(token)?;

        let row = self
            .resets
            .find(token, claims.user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = claims.user_id, "Reset token not found or already used");
                AppError::authentication(INVALID_TOKEN)
            })?;

        let now = self.clock.now();
        if row.is_expired_at(now) {
            warn!(user_id = row.user_id, row_id = row.id, "Reset row expired");
            return Err(AppError::authentication(TOKEN_EXPIRED));
        }

        self.validator.validate(new_password, &[&claims.username])?;
        let password_hash = self.hasher.hash(new_password)?;

        if !self.resets.claim(row.id, now).await? {
            warn!(user_id = row.user_id, row_id = row.id, "Reset row already claimed");
            return Err(AppError::authentication(INVALID_TOKEN));
        }

        if let Err(e) = self
            .identities
            .update_password(row.user_id, &password_hash, now)
            .await
        {
            if let Err(release_err) = self.resets.release(row.id).await {
                error!(
                    row_id = row.id,
                    error = %release_err.detailed(),
                    "Failed to release reset row after update failure"
                );
            }
            return Err(e);
        }

        if let Err(e) = self.resets.delete(row.id).await {
            warn!(
                row_id = row.id,
                user_id = row.user_id,
                error = %e.detailed(),
                "Password updated but reset row could not be deleted"
            );
        }

        info!(user_id = row.user_id, "Password reset successful");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use portal_core::traits::ManualClock;
    use portal_database::memory::{MemoryIdentityRepository, MemoryResetTokenRepository};
    use portal_entity::identity::{CreateIdentity, IdentityStatus};
    use portal_mail::testing::{FailingMailer, RecordingMailer, extract_reset_token};

    const NEW_PASSWORD: &str = "correct-horse-battery-staple";

    struct Fixture {
        manager: PasswordResetManager,
        identities: Arc<MemoryIdentityRepository>,
        resets: Arc<MemoryResetTokenRepository>,
        mailer: Arc<RecordingMailer>,
        hasher: Arc<PasswordHasher>,
        clock: Arc<ManualClock>,
    }

    fn config(conceal: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config.auth.argon2_memory_kib = 1024;
        config.auth.argon2_iterations = 1;
        config.auth.conceal_unknown_reset_accounts = conceal;
        config
    }

    fn build(
        config: &AppConfig,
        mailer: Arc<dyn Mailer>,
        recorder: Arc<RecordingMailer>,
    ) -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let identities = Arc::new(MemoryIdentityRepository::new());
        let resets = Arc::new(MemoryResetTokenRepository::new());
        let hasher = Arc::new(PasswordHasher::new(&config.auth).unwrap());

        let manager = PasswordResetManager::new(
            config,
            identities.clone(),
            resets.clone(),
            Arc::new(JwtEncoder::new(&config.auth, clock.clone())),
            Arc::new(JwtDecoder::new(&config.auth, clock.clone())),
            hasher.clone(),
            mailer,
            clock.clone(),
        );

        Fixture {
            manager,
            identities,
            resets,
            mailer: recorder,
            hasher,
            clock,
        }
    }

    fn fixture(conceal: bool) -> Fixture {
        let recorder = Arc::new(RecordingMailer::new());
        build(&config(conceal), recorder.clone(), recorder)
    }

    async fn add_identity(f: &Fixture, username: &str, status: IdentityStatus) -> i64 {
        f.identities
            .create(&CreateIdentity {
                username: username.to_string(),
                email: None,
                password_hash: f.hasher.hash("old-password").unwrap(),
                roles: vec!["end_user_read_only".to_string()],
                status,
            })
            .await
            .unwrap()
            .id
    }

    async fn request_token(f: &Fixture, username: &str) -> String {
        let outcome = f.manager.request_reset(username).await.unwrap();
        assert_eq!(outcome, ResetRequestOutcome::Sent);
        extract_reset_token(&f.mailer.last().unwrap().html_body).unwrap()
    }

    #[tokio::test]
    async fn test_request_persists_row_and_mails_link() {
        let f = fixture(true);
        let id = add_identity(&f, "alice@example.com", IdentityStatus::Active).await;

        let token = request_token(&f, "alice@example.com").await;
        let sent = f.mailer.last().unwrap();
        assert_eq!(sent.to, "alice@example.com");
        assert_eq!(sent.subject, "Password Reset Request");

        let rows = f.resets.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, id);
        assert_eq!(rows[0].token, token);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_concealed() {
        let f = fixture(true);
        add_identity(&f, "bob@example.com", IdentityStatus::Inactive).await;

        for username in ["ghost@example.com", "bob@example.com"] {
            let outcome = f.manager.request_reset(username).await.unwrap();
            assert_eq!(outcome, ResetRequestOutcome::Concealed);
        }
        assert!(f.mailer.sent().is_empty());
        assert!(f.resets.rows().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_is_404_when_not_concealed() {
        let f = fixture(false);
        let err = f.manager.request_reset("ghost@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delivery_failure_surfaces() {
        let recorder = Arc::new(RecordingMailer::new());
        let f = build(&config(true), Arc::new(FailingMailer), recorder);
        add_identity(&f, "carol@example.com", IdentityStatus::Active).await;

        let err = f.manager.request_reset("carol@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(f.resets.rows().await.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_is_single_use() {
        let f = fixture(true);
        let id = add_identity(&f, "dave@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "dave@example.com").await;

        f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap();
        let stored = f.identities.find_by_id(id).await.unwrap().unwrap();
        assert!(f.hasher.verify(NEW_PASSWORD, &stored.password_hash));
        assert!(f.resets.rows().await.is_empty());

        let err = f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_row_expiry_is_exclusive_and_independent_of_token() {
        let f = fixture(true);
        add_identity(&f, "erin@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "erin@example.com").await;

        // Row expires now; the signed token still has an hour left.
        let row = f.resets.rows().await.remove(0);
        f.resets.set_expires_at(row.id, f.clock.now()).await;

        let err = f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, TOKEN_EXPIRED);
    }

    #[tokio::test]
    async fn test_expired_signed_token_rejected() {
        let f = fixture(true);
        add_identity(&f, "frank@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "frank@example.com").await;

        f.clock.advance(Duration::minutes(61));
        let err = f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap_err();
        assert_eq!(err.message, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_update_failure_keeps_row_for_retry() {
        let f = fixture(true);
        add_identity(&f, "gina@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "gina@example.com").await;

        f.identities.fail_password_updates(true);
        let err = f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(f.resets.rows().await.len(), 1);

        f.identities.fail_password_updates(false);
        f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_confirms_only_one_succeeds() {
        let f = fixture(true);
        add_identity(&f, "jack@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "jack@example.com").await;

        let (a, b) = tokio::join!(
            f.manager.confirm_reset(&token, NEW_PASSWORD),
            f.manager.confirm_reset(&token, NEW_PASSWORD),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.into_iter().find_map(Result::err).unwrap();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, INVALID_TOKEN);
        assert!(f.resets.rows().await.is_empty());
    }

    #[tokio::test]
    async fn test_claimed_row_rejects_second_confirm() {
        let f = fixture(true);
        let id = add_identity(&f, "liam@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "liam@example.com").await;

        let row = f.resets.rows().await.remove(0);
        assert!(f.resets.claim(row.id, f.clock.now()).await.unwrap());

        let err = f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap_err();
        assert_eq!(err.message, INVALID_TOKEN);
        let stored = f.identities.find_by_id(id).await.unwrap().unwrap();
        assert!(f.hasher.verify("old-password", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_row_claimed() {
        let f = fixture(true);
        add_identity(&f, "kate@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "kate@example.com").await;

        f.resets.fail_deletes(true);
        f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap();

        let err = f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap_err();
        assert_eq!(err.message, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_fatal() {
        let f = fixture(true);
        let id = add_identity(&f, "hank@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "hank@example.com").await;

        f.resets.fail_deletes(true);
        f.manager.confirm_reset(&token, NEW_PASSWORD).await.unwrap();
        assert_eq!(f.resets.delete_attempts(), 1);

        let stored = f.identities.find_by_id(id).await.unwrap().unwrap();
        assert!(f.hasher.verify(NEW_PASSWORD, &stored.password_hash));
    }

    #[tokio::test]
    async fn test_weak_password_rejected_and_row_kept() {
        let f = fixture(true);
        add_identity(&f, "ivy@example.com", IdentityStatus::Active).await;
        let token = request_token(&f, "ivy@example.com").await;

        let err = f.manager.confirm_reset(&token, "short").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(f.resets.rows().await.len(), 1);
    }
}
