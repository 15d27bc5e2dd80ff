//! Account Entity
//!
//! Core account entity containing non-sensitive data.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, public_id::PublicId, user_name::UserName,
};

/// Account entity
///
/// Contains the public identity of an account.
/// Sensitive auth data lives in the Credentials entity,
/// contact details in the Profile entity.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// User name (unique, for login and display)
    pub user_name: UserName,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account
    pub fn new(user_name: UserName) -> Self {
        let now = Utc::now();

        Self {
            account_id: AccountId::new(),
            public_id: PublicId::new(),
            user_name,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let name = UserName::new("alice").unwrap();
        let account = Account::new(name);
        assert!(account.last_login_at.is_none());
        assert_eq!(account.public_id.as_str().len(), 21);
    }

    #[test]
    fn test_record_login() {
        let mut account = Account::new(UserName::new("alice").unwrap());
        account.record_login();
        assert!(account.last_login_at.is_some());
    }
}
