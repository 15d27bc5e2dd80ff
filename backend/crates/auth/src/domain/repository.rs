//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{
    account::Account,
    auth_session::AuthSession,
    credentials::Credentials,
    pending_login::PendingLogin,
    profile::Profile,
    reset_otp::ResetOtp,
    two_factor::{TwoFactor, TwoFactorSetup},
};
use crate::domain::value_object::{account_id::AccountId, email::Email, user_name::UserName};
use crate::error::AuthResult;
use uuid::Uuid;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create account, profile, and credentials in one transaction
    ///
    /// Returns `DuplicateUserName` / `DuplicateEmail` / `DuplicatePhone`
    /// when a unique constraint rejects the insert.
    async fn register(
        &self,
        account: &Account,
        profile: &Profile,
        credentials: &Credentials,
    ) -> AuthResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find account by user name (canonical form)
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>>;

    /// Update account
    async fn update(&self, account: &Account) -> AuthResult<()>;
}

/// Profile repository trait
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    /// Find profile by account ID
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Profile>>;

    /// Find the account owning an email address
    async fn find_account_id_by_email(&self, email: &Email) -> AuthResult<Option<AccountId>>;
}

/// Credentials repository trait
#[trait_variant::make(CredentialsRepository: Send)]
pub trait LocalCredentialsRepository {
    /// Find credentials by account ID
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credentials>>;

    /// Update credentials (password hash, failure counters)
    async fn update(&self, credentials: &Credentials) -> AuthResult<()>;
}

/// Two-factor repository trait
///
/// Covers both the enabled state and the transient setup store.
#[trait_variant::make(TwoFactorRepository: Send)]
pub trait LocalTwoFactorRepository {
    /// Find enabled 2FA state for an account
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<TwoFactor>>;

    /// Persist a confirmed enrollment (secret + backup codes)
    async fn enable(&self, state: &TwoFactor) -> AuthResult<()>;

    /// Remove 2FA state for an account (single atomic clear)
    async fn disable(&self, account_id: &AccountId) -> AuthResult<()>;

    /// Atomically consume one backup code
    ///
    /// Returns true when the code existed and was removed; a concurrent
    /// attempt with the same code sees false.
    async fn consume_backup_code(&self, account_id: &AccountId, code: &str) -> AuthResult<bool>;

    /// Store a pending setup record (replaces any prior one for the session)
    async fn store_setup(&self, setup: &TwoFactorSetup) -> AuthResult<()>;

    /// Fetch the pending setup record for a session
    async fn find_setup(&self, session_id: Uuid) -> AuthResult<Option<TwoFactorSetup>>;

    /// Drop the pending setup record for a session
    async fn delete_setup(&self, session_id: Uuid) -> AuthResult<()>;
}

/// Pending login repository trait
#[trait_variant::make(PendingLoginRepository: Send)]
pub trait LocalPendingLoginRepository {
    /// Create a pending-2FA login marker
    async fn create(&self, pending: &PendingLogin) -> AuthResult<()>;

    /// Delete all markers for an account (on successful second factor)
    async fn delete_for_account(&self, account_id: &AccountId) -> AuthResult<u64>;

    /// Clean up expired markers
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Reset OTP repository trait
#[trait_variant::make(ResetOtpRepository: Send)]
pub trait LocalResetOtpRepository {
    /// Store a freshly issued OTP
    async fn create(&self, otp: &ResetOtp) -> AuthResult<()>;

    /// Mark all outstanding (unused) OTPs for an account as used
    async fn invalidate_outstanding(&self, account_id: &AccountId) -> AuthResult<u64>;

    /// Atomically consume a matching, unused, in-window OTP
    ///
    /// Returns true when exactly one OTP was marked used; concurrent
    /// attempts with the same code see false.
    async fn consume(&self, account_id: &AccountId, code: &str) -> AuthResult<bool>;

    /// Clean up OTPs past their validity window
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find session by ID and verify fingerprint
    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Update session (e.g., last activity)
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    /// Delete a session
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete all sessions for an account (except current)
    async fn delete_all_for_account(
        &self,
        account_id: &AccountId,
        except: Option<Uuid>,
    ) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
