//! Create Link Use Case
//!
//! A caller-chosen key that is already taken fails with
//! `DuplicateKey`; a generated key retries with a fresh key instead,
//! growing the key length when collisions pile up.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::config::LinksConfig;
use crate::domain::entities::ShortLink;
use crate::domain::repository::LinkRepository;
use crate::domain::value_objects::{KEY_MAX_LENGTH, ShortKey, TargetUrl};
use crate::error::{LinkError, LinkResult};

/// Create link input
pub struct CreateLinkInput {
    /// Caller-chosen key; a random one is generated when absent
    pub custom_key: Option<String>,
    pub target_url: String,
    /// Optional expiry (Unix timestamp ms)
    pub expires_at_ms: Option<i64>,
}

/// Create link use case
pub struct CreateLinkUseCase<L>
where
    L: LinkRepository,
{
    link_repo: Arc<L>,
    config: Arc<LinksConfig>,
}

impl<L> CreateLinkUseCase<L>
where
    L: LinkRepository,
{
    pub fn new(link_repo: Arc<L>, config: Arc<LinksConfig>) -> Self {
        Self { link_repo, config }
    }

    pub async fn execute(
        &self,
        owner_account_id: Uuid,
        input: CreateLinkInput,
    ) -> LinkResult<ShortLink> {
        let target_url = TargetUrl::new(&input.target_url)?;
        let expires_at = parse_expiry(input.expires_at_ms)?;

        let link = match input.custom_key {
            Some(ref key) => {
                let short_key = ShortKey::new(key)?;
                let link = ShortLink::new(owner_account_id, short_key, target_url, expires_at);
                self.link_repo.insert(&link).await?;
                link
            }
            None => {
                self.insert_with_generated_key(owner_account_id, target_url, expires_at)
                    .await?
            }
        };

        tracing::info!(
            link_id = %link.link_id,
            short_key = %link.short_key,
            "Short link created"
        );

        Ok(link)
    }

    async fn insert_with_generated_key(
        &self,
        owner_account_id: Uuid,
        target_url: TargetUrl,
        expires_at: Option<DateTime<Utc>>,
    ) -> LinkResult<ShortLink> {
        let mut collisions = 0u32;

        loop {
            let step = (collisions / self.config.collisions_per_length_step) as usize;
            let length = (self.config.key_length + step).min(KEY_MAX_LENGTH);

            let key = ShortKey::generate_with_length(length);
            let link = ShortLink::new(
                owner_account_id,
                key,
                target_url.clone(),
                expires_at,
            );

            match self.link_repo.insert(&link).await {
                Ok(()) => return Ok(link),
                Err(LinkError::DuplicateKey) => {
                    collisions += 1;
                    tracing::debug!(collisions, length, "Generated key collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn parse_expiry(expires_at_ms: Option<i64>) -> LinkResult<Option<DateTime<Utc>>> {
    let Some(ms) = expires_at_ms else {
        return Ok(None);
    };

    let expires_at = DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| LinkError::Validation("Invalid expiry timestamp".to_string()))?;

    if expires_at <= Utc::now() {
        return Err(LinkError::Validation(
            "Expiry must be in the future".to_string(),
        ));
    }

    Ok(Some(expires_at))
}
