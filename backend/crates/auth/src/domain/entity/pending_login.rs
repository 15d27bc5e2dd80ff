//! Pending Login Entity
//!
//! Marker created when a password check succeeds on a 2FA-enabled
//! account but no code was supplied yet. No session exists until the
//! second factor is verified.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::account_id::AccountId;

/// How long a login may wait for its second factor
pub const PENDING_LOGIN_MINUTES: i64 = 5;

/// Pending (2FA-gated) login marker
#[derive(Debug, Clone)]
pub struct PendingLogin {
    /// Marker ID
    pub pending_id: Uuid,
    /// Reference to Account
    pub account_id: AccountId,
    /// Expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PendingLogin {
    pub fn new(account_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            pending_id: Uuid::new_v4(),
            account_id,
            expires_at_ms: (now + Duration::minutes(PENDING_LOGIN_MINUTES)).timestamp_millis(),
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_marker_not_expired() {
        let marker = PendingLogin::new(AccountId::new());
        assert!(!marker.is_expired());
    }
}
