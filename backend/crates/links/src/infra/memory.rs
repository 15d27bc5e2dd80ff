//! In-Memory Repository Implementation
//!
//! Backing store for unit tests. Resolution and click counting happen
//! under one lock, mirroring the single-statement SQL semantics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use kernel::id::ShortLinkId;
use uuid::Uuid;

use crate::domain::entities::ShortLink;
use crate::domain::repository::{LinkRepository, ResolveOutcome};
use crate::domain::value_objects::ShortKey;
use crate::error::{LinkError, LinkResult};

/// In-memory link repository
#[derive(Clone, Default)]
pub struct InMemoryLinkRepository {
    inner: Arc<Mutex<HashMap<Uuid, ShortLink>>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ShortLink>> {
        // A poisoned lock only means another test thread panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, link: &ShortLink) -> LinkResult<()> {
        let mut links = self.lock();

        if links.values().any(|l| l.short_key == link.short_key) {
            return Err(LinkError::DuplicateKey);
        }

        links.insert(link.link_id.into_uuid(), link.clone());
        Ok(())
    }

    async fn resolve_and_count(&self, key: &ShortKey) -> LinkResult<ResolveOutcome> {
        let now = Utc::now();
        let mut links = self.lock();

        let Some(link) = links.values_mut().find(|l| l.short_key == *key) else {
            return Ok(ResolveOutcome::NotFound);
        };

        if link.is_expired(now) {
            return Ok(ResolveOutcome::Expired);
        }

        link.clicks += 1;
        link.updated_at = now;
        Ok(ResolveOutcome::Hit(link.target_url.clone()))
    }

    async fn find_for_owner(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<Option<ShortLink>> {
        Ok(self
            .lock()
            .get(link_id.as_uuid())
            .filter(|l| l.owner_account_id == owner_account_id)
            .cloned())
    }

    async fn list_for_owner(&self, owner_account_id: Uuid) -> LinkResult<Vec<ShortLink>> {
        let mut links: Vec<ShortLink> = self
            .lock()
            .values()
            .filter(|l| l.owner_account_id == owner_account_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn update_for_owner(&self, link: &ShortLink) -> LinkResult<bool> {
        let mut links = self.lock();

        match links.get_mut(link.link_id.as_uuid()) {
            Some(existing) if existing.owner_account_id == link.owner_account_id => {
                existing.target_url = link.target_url.clone();
                existing.expires_at = link.expires_at;
                existing.updated_at = link.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_for_owner(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<bool> {
        let mut links = self.lock();

        match links.get(link_id.as_uuid()) {
            Some(l) if l.owner_account_id == owner_account_id => {
                links.remove(link_id.as_uuid());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
