//! Credentials Entity
//!
//! Password and lockout state for an account.
//! Separated from Account to isolate sensitive data.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{account_id::AccountId, user_password::UserPassword};

/// Credentials entity
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Reference to Account
    pub account_id: AccountId,
    /// Hashed password
    pub password_hash: UserPassword,
    /// Consecutive login failure count
    pub login_failed_count: u16,
    /// Last login failure time
    pub last_failed_at: Option<DateTime<Utc>>,
    /// Account locked until (temporary lockout after failures)
    pub locked_until: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Credentials {
    /// Maximum login failures before temporary lockout
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    /// Lockout duration in minutes
    pub const LOCKOUT_MINUTES: i64 = 15;

    /// Create new credentials
    pub fn new(account_id: AccountId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            password_hash,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if account is currently locked
    pub fn is_locked(&self) -> bool {
        if let Some(locked_until) = self.locked_until {
            Utc::now() < locked_until
        } else {
            false
        }
    }

    /// Record a failed login attempt
    pub fn record_failure(&mut self) {
        let now = Utc::now();
        self.login_failed_count += 1;
        self.last_failed_at = Some(now);
        self.updated_at = now;

        // Lock account after too many failures
        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + chrono::Duration::minutes(Self::LOCKOUT_MINUTES));
        }
    }

    /// Reset login failure count on successful login
    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }

    /// Update password
    pub fn update_password(&mut self, new_password: UserPassword) {
        self.password_hash = new_password;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;

    fn test_credentials() -> Credentials {
        let raw = RawPassword::new("CorrectHorse9!".to_string()).unwrap();
        let hash = UserPassword::from_raw(&raw, None).unwrap();
        Credentials::new(AccountId::new(), hash)
    }

    #[test]
    fn test_lockout_after_max_failures() {
        let mut creds = test_credentials();
        assert!(!creds.is_locked());

        for _ in 0..Credentials::MAX_LOGIN_FAILURES {
            creds.record_failure();
        }
        assert!(creds.is_locked());
    }

    #[test]
    fn test_reset_failures_unlocks() {
        let mut creds = test_credentials();
        for _ in 0..Credentials::MAX_LOGIN_FAILURES {
            creds.record_failure();
        }
        creds.reset_failures();
        assert!(!creds.is_locked());
        assert_eq!(creds.login_failed_count, 0);
    }
}
