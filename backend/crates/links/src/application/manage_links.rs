//! Manage Links Use Case
//!
//! Owner-scoped listing, inspection, update, and deletion. Every
//! lookup carries the owner's account ID, so a link belonging to
//! someone else is indistinguishable from a missing one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::ShortLinkId;
use uuid::Uuid;

use crate::domain::entities::ShortLink;
use crate::domain::repository::LinkRepository;
use crate::domain::value_objects::TargetUrl;
use crate::error::{LinkError, LinkResult};

/// Update link input
pub struct UpdateLinkInput {
    /// New target URL, if changing
    pub target_url: Option<String>,
    /// New expiry (Unix timestamp ms), if changing
    pub expires_at_ms: Option<i64>,
    /// Remove the expiry entirely
    pub clear_expiry: bool,
}

/// Manage links use case
pub struct ManageLinksUseCase<L>
where
    L: LinkRepository,
{
    link_repo: Arc<L>,
}

impl<L> ManageLinksUseCase<L>
where
    L: LinkRepository,
{
    pub fn new(link_repo: Arc<L>) -> Self {
        Self { link_repo }
    }

    pub async fn list(&self, owner_account_id: Uuid) -> LinkResult<Vec<ShortLink>> {
        self.link_repo.list_for_owner(owner_account_id).await
    }

    pub async fn get(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<ShortLink> {
        self.link_repo
            .find_for_owner(link_id, owner_account_id)
            .await?
            .ok_or(LinkError::NotFound)
    }

    pub async fn update(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
        input: UpdateLinkInput,
    ) -> LinkResult<ShortLink> {
        let mut link = self.get(link_id, owner_account_id).await?;

        if let Some(ref url) = input.target_url {
            link.target_url = TargetUrl::new(url)?;
        }

        if input.clear_expiry {
            link.expires_at = None;
        } else if let Some(ms) = input.expires_at_ms {
            let expires_at = DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| LinkError::Validation("Invalid expiry timestamp".to_string()))?;
            if expires_at <= Utc::now() {
                return Err(LinkError::Validation(
                    "Expiry must be in the future".to_string(),
                ));
            }
            link.expires_at = Some(expires_at);
        }

        link.updated_at = Utc::now();

        let updated = self.link_repo.update_for_owner(&link).await?;
        if !updated {
            return Err(LinkError::NotFound);
        }

        tracing::info!(link_id = %link.link_id, "Short link updated");
        Ok(link)
    }

    pub async fn delete(&self, link_id: &ShortLinkId, owner_account_id: Uuid) -> LinkResult<()> {
        let deleted = self
            .link_repo
            .delete_for_owner(link_id, owner_account_id)
            .await?;

        if !deleted {
            return Err(LinkError::NotFound);
        }

        tracing::info!(link_id = %link_id, "Short link deleted");
        Ok(())
    }
}
