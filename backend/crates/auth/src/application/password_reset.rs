//! Password Reset Use Case
//!
//! OTP-based reset in three steps:
//! 1. `request` - issue a 6-digit code and hand it to the notifier.
//!    Always reports success so callers cannot probe which emails exist.
//! 2. `verify` - consume the code atomically, issue a short-lived
//!    signed reset token.
//! 3. `complete` - replace the password and revoke all sessions.
//!
//! Issuing a new code marks earlier outstanding codes used, so only
//! the most recent code can ever succeed.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::notify::NotificationSender;
use crate::application::token;
use crate::domain::entity::reset_otp::ResetOtp;
use crate::domain::repository::{
    CredentialsRepository, ProfileRepository, ResetOtpRepository, SessionRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, otp_code::OtpCode, user_password::RawPassword,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// Password reset use case
pub struct PasswordResetUseCase<P, C, R, S, N>
where
    P: ProfileRepository,
    C: CredentialsRepository,
    R: ResetOtpRepository,
    S: SessionRepository,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    credentials_repo: Arc<C>,
    otp_repo: Arc<R>,
    session_repo: Arc<S>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<P, C, R, S, N> PasswordResetUseCase<P, C, R, S, N>
where
    P: ProfileRepository,
    C: CredentialsRepository,
    R: ResetOtpRepository,
    S: SessionRepository,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    pub fn new(
        profile_repo: Arc<P>,
        credentials_repo: Arc<C>,
        otp_repo: Arc<R>,
        session_repo: Arc<S>,
        notifier: Arc<N>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            profile_repo,
            credentials_repo,
            otp_repo,
            session_repo,
            notifier,
            config,
        }
    }

    /// Request a reset code for the given email
    ///
    /// Returns Ok regardless of whether the email is registered.
    pub async fn request(&self, email: &str) -> AuthResult<()> {
        let Ok(email) = Email::new(email) else {
            tracing::debug!("Reset requested for malformed email");
            return Ok(());
        };

        let Some(account_id) = self.profile_repo.find_account_id_by_email(&email).await? else {
            tracing::debug!("Reset requested for unknown email");
            return Ok(());
        };

        // A fresh code supersedes anything still outstanding
        self.otp_repo.invalidate_outstanding(&account_id).await?;

        let otp = ResetOtp::issue(account_id);
        self.otp_repo.create(&otp).await?;

        // Delivery is fire-and-forget; the requester never learns
        // whether it went out
        let notifier = self.notifier.clone();
        let to = email.as_str().to_string();
        let body = format!(
            "Your password reset code is {}. It expires in 10 minutes.",
            otp.code
        );
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&to, "Password reset code", &body).await {
                tracing::warn!(error = %e, "Failed to deliver reset code");
            }
        });

        tracing::info!(account_id = %account_id, "Reset OTP issued");
        Ok(())
    }

    /// Verify a reset code, returning a short-lived reset token
    ///
    /// Wrong email, wrong code, replayed code, and expired code are
    /// indistinguishable to the caller.
    pub async fn verify(&self, email: &str, code: &str) -> AuthResult<String> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidOrExpiredOtp)?;

        if !OtpCode::is_well_formed(code) {
            return Err(AuthError::InvalidOrExpiredOtp);
        }

        let account_id = self
            .profile_repo
            .find_account_id_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidOrExpiredOtp)?;

        let consumed = self.otp_repo.consume(&account_id, code).await?;
        if !consumed {
            return Err(AuthError::InvalidOrExpiredOtp);
        }

        let expires_at_ms =
            Utc::now().timestamp_millis() + self.config.reset_token_ttl.as_millis() as i64;

        let reset_token = token::sign_reset_token(
            &self.config.session_secret,
            account_id.into_uuid(),
            expires_at_ms,
        )?;

        tracing::info!(account_id = %account_id, "Reset OTP verified");
        Ok(reset_token)
    }

    /// Complete the reset: replace the password, revoke all sessions
    pub async fn complete(&self, reset_token: &str, new_password: String) -> AuthResult<()> {
        let account_uuid =
            token::parse_reset_token(&self.config.session_secret, reset_token)?;
        let account_id = AccountId::from_uuid(account_uuid);

        let raw_password = RawPassword::new(new_password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(&account_id)
            .await?
            .ok_or(AuthError::InvalidOrExpiredOtp)?;

        credentials.update_password(password_hash);
        credentials.reset_failures();
        self.credentials_repo.update(&credentials).await?;

        // Existing sessions were opened with the old password
        let revoked = self
            .session_repo
            .delete_all_for_account(&account_id, None)
            .await?;

        tracing::info!(
            account_id = %account_id,
            revoked_sessions = revoked,
            "Password reset completed"
        );

        Ok(())
    }
}
