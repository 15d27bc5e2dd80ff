//! Reset OTP Entity
//!
//! A single password reset code. Codes are single-use and valid only
//! inside a short window; issuing a new code invalidates prior
//! outstanding codes for the account.

use chrono::{DateTime, Duration, Utc};
use kernel::id::ResetOtpId;

use crate::domain::value_object::{account_id::AccountId, otp_code::OtpCode};

/// Validity window for a reset OTP
pub const OTP_VALID_MINUTES: i64 = 10;

/// Password reset OTP entity
#[derive(Debug, Clone)]
pub struct ResetOtp {
    /// OTP record ID
    pub otp_id: ResetOtpId,
    /// Reference to Account
    pub account_id: AccountId,
    /// Six-digit code
    pub code: OtpCode,
    /// Whether the code has been consumed
    pub used: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl ResetOtp {
    /// Issue a fresh OTP for an account
    pub fn issue(account_id: AccountId) -> Self {
        Self {
            otp_id: ResetOtpId::new(),
            account_id,
            code: OtpCode::generate(),
            used: false,
            created_at: Utc::now(),
        }
    }

    /// Check if this OTP is still inside its validity window
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < Duration::minutes(OTP_VALID_MINUTES)
    }

    /// Check if this OTP can still be consumed
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.is_within_window(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_otp_is_usable() {
        let otp = ResetOtp::issue(AccountId::new());
        assert!(otp.is_usable(Utc::now()));
    }

    #[test]
    fn test_otp_expires_after_window() {
        let otp = ResetOtp::issue(AccountId::new());
        let later = Utc::now() + Duration::minutes(OTP_VALID_MINUTES + 1);
        assert!(!otp.is_usable(later));
    }

    #[test]
    fn test_used_otp_is_not_usable() {
        let mut otp = ResetOtp::issue(AccountId::new());
        otp.used = true;
        assert!(!otp.is_usable(Utc::now()));
    }
}
