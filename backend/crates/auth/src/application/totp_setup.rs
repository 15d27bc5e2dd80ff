//! TOTP Setup Use Case
//!
//! Enrollment, confirmation, and removal of TOTP two-factor auth.
//!
//! The candidate secret never touches the account until the user
//! confirms a valid code: `begin` parks it in the setup store keyed by
//! the current session, and `confirm` promotes it together with a
//! fresh batch of backup codes (returned exactly once).

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::two_factor::{TwoFactor, TwoFactorSetup};
use crate::domain::repository::{AccountRepository, ProfileRepository, TwoFactorRepository};
use crate::domain::value_object::{account_id::AccountId, backup_code::BackupCode};
use crate::error::{AuthError, AuthResult};

/// TOTP setup output
pub struct TotpSetupOutput {
    /// QR code as base64-encoded PNG
    pub qr_code_base64: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// TOTP setup use case
pub struct TotpSetupUseCase<A, P, T>
where
    A: AccountRepository,
    P: ProfileRepository,
    T: TwoFactorRepository,
{
    account_repo: Arc<A>,
    profile_repo: Arc<P>,
    two_factor_repo: Arc<T>,
}

impl<A, P, T> TotpSetupUseCase<A, P, T>
where
    A: AccountRepository,
    P: ProfileRepository,
    T: TwoFactorRepository,
{
    pub fn new(account_repo: Arc<A>, profile_repo: Arc<P>, two_factor_repo: Arc<T>) -> Self {
        Self {
            account_repo,
            profile_repo,
            two_factor_repo,
        }
    }

    /// Start TOTP enrollment - generates a candidate secret
    ///
    /// Repeating this for the same session replaces the prior candidate.
    pub async fn begin(
        &self,
        session_id: Uuid,
        account_id: &AccountId,
    ) -> AuthResult<TotpSetupOutput> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if self
            .two_factor_repo
            .find_by_account_id(account_id)
            .await?
            .is_some()
        {
            return Err(AuthError::TwoFactorAlreadyEnabled);
        }

        let setup = TwoFactorSetup::new(session_id, *account_id);
        self.two_factor_repo.store_setup(&setup).await?;

        // The provisioning URI is labeled with the account's email; a
        // profile should always exist alongside the account
        let profile = self.profile_repo.find_by_account_id(account_id).await?;
        let label = match profile.as_ref() {
            Some(p) => p.email.as_str(),
            None => {
                tracing::warn!(
                    public_id = %account.public_id,
                    "Account has no profile row; labeling provisioning URI with user name"
                );
                account.user_name.as_str()
            }
        };

        let qr_code = setup
            .secret
            .generate_qr_code(label)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let otpauth_url = setup
            .secret
            .get_otpauth_url(label)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            public_id = %account.public_id,
            "TOTP enrollment initiated"
        );

        Ok(TotpSetupOutput {
            qr_code_base64: qr_code,
            secret: setup.secret.as_base32().to_string(),
            otpauth_url,
        })
    }

    /// Confirm the candidate secret and enable 2FA
    ///
    /// Returns the backup codes; they are shown to the user only here.
    pub async fn confirm(
        &self,
        session_id: Uuid,
        account_id: &AccountId,
        code: &str,
    ) -> AuthResult<Vec<BackupCode>> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let setup = self
            .two_factor_repo
            .find_setup(session_id)
            .await?
            .filter(|s| s.account_id == *account_id)
            .ok_or(AuthError::TwoFactorNotSetup)?;

        let valid = setup
            .secret
            .verify(code, account.user_name.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        let backup_codes = BackupCode::generate_batch();
        let state = TwoFactor::enabled(*account_id, setup.secret, backup_codes.clone());

        self.two_factor_repo.enable(&state).await?;
        self.two_factor_repo.delete_setup(session_id).await?;

        tracing::info!(
            public_id = %account.public_id,
            "TOTP enabled"
        );

        Ok(backup_codes)
    }

    /// Disable TOTP after verifying a current code or backup code
    ///
    /// Secret and remaining backup codes are cleared in one step.
    pub async fn disable(&self, account_id: &AccountId, code: &str) -> AuthResult<()> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let two_factor = self
            .two_factor_repo
            .find_by_account_id(account_id)
            .await?
            .ok_or(AuthError::TwoFactorNotSetup)?;

        let totp_valid = two_factor
            .secret
            .verify(code, account.user_name.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !totp_valid {
            let consumed = self
                .two_factor_repo
                .consume_backup_code(account_id, BackupCode::normalize_input(code))
                .await?;

            if !consumed {
                return Err(AuthError::InvalidTwoFactorCode);
            }
        }

        self.two_factor_repo.disable(account_id).await?;

        tracing::info!(
            public_id = %account.public_id,
            "TOTP disabled"
        );

        Ok(())
    }
}
