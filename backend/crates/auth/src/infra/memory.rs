//! In-Memory Repository Implementation
//!
//! Backing store for unit tests and local development without a
//! database. Mirrors the PostgreSQL implementation's semantics,
//! including atomic backup-code and OTP consumption.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account,
    auth_session::AuthSession,
    credentials::Credentials,
    pending_login::PendingLogin,
    profile::Profile,
    reset_otp::ResetOtp,
    two_factor::{TwoFactor, TwoFactorSetup},
};
use crate::domain::repository::{
    AccountRepository, CredentialsRepository, PendingLoginRepository, ProfileRepository,
    ResetOtpRepository, SessionRepository, TwoFactorRepository,
};
use crate::domain::value_object::{account_id::AccountId, email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    profiles: HashMap<Uuid, Profile>,
    credentials: HashMap<Uuid, Credentials>,
    two_factor: HashMap<Uuid, TwoFactor>,
    setups: HashMap<Uuid, TwoFactorSetup>,
    pending: HashMap<Uuid, PendingLogin>,
    otps: Vec<ResetOtp>,
    sessions: HashMap<Uuid, AuthSession>,
}

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AccountRepository for InMemoryAuthRepository {
    async fn register(
        &self,
        account: &Account,
        profile: &Profile,
        credentials: &Credentials,
    ) -> AuthResult<()> {
        let mut inner = self.lock();

        if inner
            .accounts
            .values()
            .any(|a| a.user_name.canonical() == account.user_name.canonical())
        {
            return Err(AuthError::DuplicateUserName);
        }
        if inner.profiles.values().any(|p| p.email == profile.email) {
            return Err(AuthError::DuplicateEmail);
        }
        if inner.profiles.values().any(|p| p.phone == profile.phone) {
            return Err(AuthError::DuplicatePhone);
        }

        let id = account.account_id.into_uuid();
        inner.accounts.insert(id, account.clone());
        inner.profiles.insert(id, profile.clone());
        inner.credentials.insert(id, credentials.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.lock().accounts.get(account_id.as_uuid()).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        Ok(self
            .lock()
            .accounts
            .values()
            .find(|a| a.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        self.lock()
            .accounts
            .insert(account.account_id.into_uuid(), account.clone());
        Ok(())
    }
}

impl ProfileRepository for InMemoryAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Profile>> {
        Ok(self.lock().profiles.get(account_id.as_uuid()).cloned())
    }

    async fn find_account_id_by_email(&self, email: &Email) -> AuthResult<Option<AccountId>> {
        Ok(self
            .lock()
            .profiles
            .values()
            .find(|p| p.email == *email)
            .map(|p| p.account_id))
    }
}

impl CredentialsRepository for InMemoryAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credentials>> {
        Ok(self.lock().credentials.get(account_id.as_uuid()).cloned())
    }

    async fn update(&self, credentials: &Credentials) -> AuthResult<()> {
        self.lock()
            .credentials
            .insert(credentials.account_id.into_uuid(), credentials.clone());
        Ok(())
    }
}

impl TwoFactorRepository for InMemoryAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<TwoFactor>> {
        Ok(self.lock().two_factor.get(account_id.as_uuid()).cloned())
    }

    async fn enable(&self, state: &TwoFactor) -> AuthResult<()> {
        self.lock()
            .two_factor
            .insert(state.account_id.into_uuid(), state.clone());
        Ok(())
    }

    async fn disable(&self, account_id: &AccountId) -> AuthResult<()> {
        self.lock().two_factor.remove(account_id.as_uuid());
        Ok(())
    }

    async fn consume_backup_code(&self, account_id: &AccountId, code: &str) -> AuthResult<bool> {
        let mut inner = self.lock();
        let Some(state) = inner.two_factor.get_mut(account_id.as_uuid()) else {
            return Ok(false);
        };

        // Check and remove under the same lock, matching the SQL
        // single-statement semantics
        let before = state.backup_codes.len();
        state.backup_codes.retain(|c| c.as_str() != code);
        Ok(state.backup_codes.len() < before)
    }

    async fn store_setup(&self, setup: &TwoFactorSetup) -> AuthResult<()> {
        self.lock().setups.insert(setup.session_id, setup.clone());
        Ok(())
    }

    async fn find_setup(&self, session_id: Uuid) -> AuthResult<Option<TwoFactorSetup>> {
        Ok(self.lock().setups.get(&session_id).cloned())
    }

    async fn delete_setup(&self, session_id: Uuid) -> AuthResult<()> {
        self.lock().setups.remove(&session_id);
        Ok(())
    }
}

impl PendingLoginRepository for InMemoryAuthRepository {
    async fn create(&self, pending: &PendingLogin) -> AuthResult<()> {
        self.lock().pending.insert(pending.pending_id, pending.clone());
        Ok(())
    }

    async fn delete_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let mut inner = self.lock();
        let before = inner.pending.len();
        inner.pending.retain(|_, p| p.account_id != *account_id);
        Ok((before - inner.pending.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut inner = self.lock();
        let before = inner.pending.len();
        inner.pending.retain(|_, p| !p.is_expired());
        Ok((before - inner.pending.len()) as u64)
    }
}

impl ResetOtpRepository for InMemoryAuthRepository {
    async fn create(&self, otp: &ResetOtp) -> AuthResult<()> {
        self.lock().otps.push(otp.clone());
        Ok(())
    }

    async fn invalidate_outstanding(&self, account_id: &AccountId) -> AuthResult<u64> {
        let mut inner = self.lock();
        let mut count = 0;
        for otp in inner
            .otps
            .iter_mut()
            .filter(|o| o.account_id == *account_id && !o.used)
        {
            otp.used = true;
            count += 1;
        }
        Ok(count)
    }

    async fn consume(&self, account_id: &AccountId, code: &str) -> AuthResult<bool> {
        let now = Utc::now();
        let mut inner = self.lock();

        let candidate = inner
            .otps
            .iter_mut()
            .filter(|o| o.account_id == *account_id && o.code.as_str() == code && o.is_usable(now))
            .max_by_key(|o| o.created_at);

        match candidate {
            Some(otp) => {
                otp.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut inner = self.lock();
        let before = inner.otps.len();
        inner.otps.retain(|o| o.is_within_window(now));
        Ok((before - inner.otps.len()) as u64)
    }
}

impl SessionRepository for InMemoryAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.lock().sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let inner = self.lock();
        let Some(session) = inner.sessions.get(&session_id) else {
            return Ok(None);
        };

        if session.is_expired() {
            return Ok(None);
        }

        if session.client_fingerprint_hash != fingerprint_hash {
            return Err(AuthError::SessionFingerprintMismatch);
        }

        Ok(Some(session.clone()))
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        self.lock().sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_account(
        &self,
        account_id: &AccountId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let mut inner = self.lock();
        let before = inner.sessions.len();
        inner
            .sessions
            .retain(|id, s| s.account_id != *account_id || Some(*id) == except);
        Ok((before - inner.sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut inner = self.lock();
        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| !s.is_expired());
        Ok((before - inner.sessions.len()) as u64)
    }
}
