//! Two-Factor Entity
//!
//! Enabled TOTP state for an account, plus the transient setup record
//! held while enrollment is pending confirmation. A secret only moves
//! onto the account (TwoFactor) after the user proves possession by
//! confirming a valid code; until then it lives in TwoFactorSetup.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::{
    account_id::AccountId, backup_code::BackupCode, totp_secret::TotpSecret,
};

/// Enabled two-factor state
///
/// Invariant: a row exists only for accounts where enrollment was
/// confirmed. `backup_codes` holds the remaining unconsumed codes.
#[derive(Debug, Clone)]
pub struct TwoFactor {
    /// Reference to Account
    pub account_id: AccountId,
    /// Confirmed TOTP secret
    pub secret: TotpSecret,
    /// Remaining single-use backup codes
    pub backup_codes: Vec<BackupCode>,
    /// Created timestamp (enrollment time)
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl TwoFactor {
    /// Create enabled state from a confirmed enrollment
    pub fn enabled(account_id: AccountId, secret: TotpSecret, backup_codes: Vec<BackupCode>) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            secret,
            backup_codes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Pending enrollment record
///
/// Keyed by the session that started setup so a parallel login on
/// another device cannot confirm someone else's enrollment.
#[derive(Debug, Clone)]
pub struct TwoFactorSetup {
    /// Session that initiated setup
    pub session_id: Uuid,
    /// Reference to Account
    pub account_id: AccountId,
    /// Candidate secret, not yet confirmed
    pub secret: TotpSecret,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl TwoFactorSetup {
    pub fn new(session_id: Uuid, account_id: AccountId) -> Self {
        Self {
            session_id,
            account_id,
            secret: TotpSecret::generate(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_generates_fresh_secret() {
        let account_id = AccountId::new();
        let a = TwoFactorSetup::new(Uuid::new_v4(), account_id);
        let b = TwoFactorSetup::new(Uuid::new_v4(), account_id);
        assert_ne!(a.secret.as_base32(), b.secret.as_base32());
    }

    #[test]
    fn test_enabled_keeps_codes() {
        let codes = BackupCode::generate_batch();
        let state = TwoFactor::enabled(AccountId::new(), TotpSecret::generate(), codes.clone());
        assert_eq!(state.backup_codes.len(), codes.len());
    }
}
