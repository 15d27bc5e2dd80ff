//! Login Use Case
//!
//! Authenticates an account and creates a session. When 2FA is enabled
//! and no code accompanies the credentials, the login parks in a
//! pending state and no session is created.
//!
//! Failure reporting is deliberately flat: unknown user name and wrong
//! password both surface as `InvalidCredentials`.

use std::sync::Arc;

use chrono::Duration;

use crate::application::config::AuthConfig;
use crate::application::token;
use crate::domain::entity::{auth_session::AuthSession, pending_login::PendingLogin};
use crate::domain::repository::{
    AccountRepository, CredentialsRepository, PendingLoginRepository, SessionRepository,
    TwoFactorRepository,
};
use crate::domain::value_object::{
    backup_code::BackupCode, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

/// Re-export ClientFingerprint from platform
pub use platform::client::ClientFingerprint;

/// Login input
pub struct LoginInput {
    /// User name
    pub user_name: String,
    /// Password
    pub password: String,
    /// Remember me flag
    pub remember_me: bool,
    /// TOTP or backup code (if 2FA is enabled)
    pub totp_code: Option<String>,
}

/// Login output
pub struct LoginOutput {
    /// Session token for cookie (empty while 2FA is pending)
    pub session_token: String,
    /// Whether a second factor is still required
    pub requires_2fa: bool,
    /// Public ID
    pub public_id: String,
}

/// Login use case
pub struct LoginUseCase<A, C, T, P, S>
where
    A: AccountRepository,
    C: CredentialsRepository,
    T: TwoFactorRepository,
    P: PendingLoginRepository,
    S: SessionRepository,
{
    account_repo: Arc<A>,
    credentials_repo: Arc<C>,
    two_factor_repo: Arc<T>,
    pending_repo: Arc<P>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<A, C, T, P, S> LoginUseCase<A, C, T, P, S>
where
    A: AccountRepository,
    C: CredentialsRepository,
    T: TwoFactorRepository,
    P: PendingLoginRepository,
    S: SessionRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        credentials_repo: Arc<C>,
        two_factor_repo: Arc<T>,
        pending_repo: Arc<P>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            account_repo,
            credentials_repo,
            two_factor_repo,
            pending_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: LoginInput,
        fingerprint: ClientFingerprint,
    ) -> AuthResult<LoginOutput> {
        let user_name =
            UserName::new(&input.user_name).map_err(|_| AuthError::InvalidCredentials)?;

        let mut account = self
            .account_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(&account.account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        if credentials.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !credentials
            .password_hash
            .verify(&raw_password, self.config.pepper())
        {
            credentials.record_failure();
            self.credentials_repo.update(&credentials).await?;
            return Err(AuthError::InvalidCredentials);
        }

        // Second factor, if enrolled
        if let Some(two_factor) = self
            .two_factor_repo
            .find_by_account_id(&account.account_id)
            .await?
        {
            match input.totp_code.as_deref() {
                None => {
                    // Password was right but no session yet; park the login
                    let pending = PendingLogin::new(account.account_id);
                    self.pending_repo.create(&pending).await?;

                    tracing::debug!(
                        public_id = %account.public_id,
                        "Login pending second factor"
                    );

                    return Ok(LoginOutput {
                        session_token: String::new(),
                        requires_2fa: true,
                        public_id: account.public_id.to_string(),
                    });
                }
                Some(code) => {
                    let totp_valid = two_factor
                        .secret
                        .verify(code, account.user_name.as_str())
                        .map_err(|e| AuthError::Internal(e.to_string()))?;

                    if !totp_valid {
                        // Fall back to a single-use backup code
                        let consumed = self
                            .two_factor_repo
                            .consume_backup_code(
                                &account.account_id,
                                BackupCode::normalize_input(code),
                            )
                            .await?;

                        if !consumed {
                            return Err(AuthError::InvalidTwoFactorCode);
                        }

                        tracing::info!(
                            public_id = %account.public_id,
                            "Backup code consumed for login"
                        );
                    }

                    // Clear any parked logins for this account
                    self.pending_repo
                        .delete_for_account(&account.account_id)
                        .await?;
                }
            }
        }

        credentials.reset_failures();
        self.credentials_repo.update(&credentials).await?;

        account.record_login();
        self.account_repo.update(&account).await?;

        let ttl = if input.remember_me {
            Duration::milliseconds(self.config.session_ttl_long_ms())
        } else {
            Duration::milliseconds(self.config.session_ttl_short_ms())
        };

        let session = AuthSession::new(
            account.account_id,
            account.public_id,
            input.remember_me,
            fingerprint.hash_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            ttl,
        );

        self.session_repo.create(&session).await?;

        let session_token = token::sign_session_token(&self.config.session_secret, session.session_id)?;

        tracing::info!(
            public_id = %account.public_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "Account logged in"
        );

        Ok(LoginOutput {
            session_token,
            requires_2fa: false,
            public_id: account.public_id.to_string(),
        })
    }
}
