//! Auth Session Entity
//!
//! Represents an authenticated session.
//! Stored in database with cookie-based token reference.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::{account_id::AccountId, public_id::PublicId};

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    /// Reference to Account
    pub account_id: AccountId,
    /// Public ID for API responses
    pub public_id: PublicId,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Whether "Remember Me" was checked
    pub remember_me: bool,
    /// Client fingerprint hash (User-Agent based)
    pub client_fingerprint_hash: Vec<u8>,
    /// Client IP (optional, for logging)
    pub client_ip: Option<String>,
    /// User agent string (for session management display)
    pub user_agent: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a new auth session
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: AccountId,
        public_id: PublicId,
        remember_me: bool,
        fingerprint_hash: Vec<u8>,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            account_id,
            public_id,
            expires_at_ms: (now + ttl).timestamp_millis(),
            remember_me,
            client_fingerprint_hash: fingerprint_hash,
            client_ip,
            user_agent,
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Extend session if "Remember Me" is enabled
    ///
    /// The extension policy is intentionally simple:
    /// - only applies to remember_me sessions
    /// - extend to (now + ttl_long) when less than half of ttl_long remains
    pub fn extend_if_needed(&mut self, ttl_long: Duration) {
        if !self.remember_me {
            return;
        }

        let now = Utc::now();
        let new_expires = (now + ttl_long).timestamp_millis();

        if self.expires_at_ms < (now + (ttl_long / 2)).timestamp_millis() {
            self.expires_at_ms = new_expires;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session(remember_me: bool, ttl: Duration) -> AuthSession {
        AuthSession::new(
            AccountId::new(),
            PublicId::new(),
            remember_me,
            vec![0u8; 32],
            None,
            Some("test-agent".to_string()),
            ttl,
        )
    }

    #[test]
    fn test_fresh_session_not_expired() {
        let session = test_session(false, Duration::hours(2));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_expired_session() {
        let session = test_session(false, Duration::milliseconds(-1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_extend_only_remember_me() {
        let ttl_long = Duration::days(30);

        // Non-remember session never extends
        let mut session = test_session(false, Duration::hours(1));
        let before = session.expires_at_ms;
        session.extend_if_needed(ttl_long);
        assert_eq!(session.expires_at_ms, before);

        // Remember-me session with little time left extends
        let mut session = test_session(true, Duration::days(2));
        let before = session.expires_at_ms;
        session.extend_if_needed(ttl_long);
        assert!(session.expires_at_ms > before);
    }
}
