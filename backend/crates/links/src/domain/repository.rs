//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::ShortLinkId;
use uuid::Uuid;

use crate::domain::entities::ShortLink;
use crate::domain::value_objects::{ShortKey, TargetUrl};
use crate::error::LinkResult;

/// Result of resolving a short key for redirection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Live link; the click has already been counted
    Hit(TargetUrl),
    /// Key exists but the link's expiry has passed
    Expired,
    /// No link under this key
    NotFound,
}

/// Short link repository trait
#[trait_variant::make(LinkRepository: Send)]
pub trait LocalLinkRepository {
    /// Insert a new link; fails with `DuplicateKey` when the key is taken
    async fn insert(&self, link: &ShortLink) -> LinkResult<()>;

    /// Resolve a key and count the click in the same operation
    ///
    /// Concurrent resolutions of the same key must each be counted.
    async fn resolve_and_count(&self, key: &ShortKey) -> LinkResult<ResolveOutcome>;

    /// Fetch a link by ID, scoped to its owner
    async fn find_for_owner(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<Option<ShortLink>>;

    /// List all links owned by an account, newest first
    async fn list_for_owner(&self, owner_account_id: Uuid) -> LinkResult<Vec<ShortLink>>;

    /// Update target URL and expiry, scoped to the owner
    ///
    /// Returns false when no owned link matched.
    async fn update_for_owner(&self, link: &ShortLink) -> LinkResult<bool>;

    /// Delete a link, scoped to its owner
    ///
    /// Returns false when no owned link matched.
    async fn delete_for_owner(
        &self,
        link_id: &ShortLinkId,
        owner_account_id: Uuid,
    ) -> LinkResult<bool>;
}
