//! Resolve Link Use Case
//!
//! The redirect hot path: one repository call resolves the key and
//! counts the click.

use std::sync::Arc;

use crate::domain::repository::{LinkRepository, ResolveOutcome};
use crate::domain::value_objects::ShortKey;
use crate::error::LinkResult;

/// Resolve link use case
pub struct ResolveLinkUseCase<L>
where
    L: LinkRepository,
{
    link_repo: Arc<L>,
}

impl<L> ResolveLinkUseCase<L>
where
    L: LinkRepository,
{
    pub fn new(link_repo: Arc<L>) -> Self {
        Self { link_repo }
    }

    pub async fn execute(&self, key: &str) -> LinkResult<ResolveOutcome> {
        // A key that could never have been issued is just a miss
        let Ok(key) = ShortKey::new(key) else {
            return Ok(ResolveOutcome::NotFound);
        };

        self.link_repo.resolve_and_count(&key).await
    }
}
