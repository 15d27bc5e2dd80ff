//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::ShortLinkId;
use uuid::Uuid;

use crate::domain::value_objects::{ShortKey, TargetUrl};

/// ShortLink entity - a key-to-URL mapping owned by an account
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub link_id: ShortLinkId,
    /// Internal account ID of the owner
    pub owner_account_id: Uuid,
    pub short_key: ShortKey,
    pub target_url: TargetUrl,
    /// Total redirects served
    pub clicks: i64,
    /// Optional expiry; a link past this moment answers 410
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    pub fn new(
        owner_account_id: Uuid,
        short_key: ShortKey,
        target_url: TargetUrl,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            link_id: ShortLinkId::new(),
            owner_account_id,
            short_key,
            target_url,
            clicks: 0,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the link has passed its expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>) -> ShortLink {
        ShortLink::new(
            Uuid::new_v4(),
            ShortKey::new("abc123").unwrap(),
            TargetUrl::new("https://example.com").unwrap(),
            expires_at,
        )
    }

    #[test]
    fn test_new_link_starts_with_zero_clicks() {
        let link = link(None);
        assert_eq!(link.clicks, 0);
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();

        assert!(!link(None).is_expired(now));
        assert!(!link(Some(now + Duration::hours(1))).is_expired(now));
        assert!(link(Some(now - Duration::seconds(1))).is_expired(now));
        // Exactly at the boundary counts as expired
        assert!(link(Some(now)).is_expired(now));
    }
}
