//! HTTP Handlers
//!
//! Management handlers read the authenticated
//! [`kernel::principal::Principal`] from request extensions (inserted
//! by the auth middleware). The redirect handler is public.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use kernel::id::ShortLinkId;
use kernel::principal::Principal;
use uuid::Uuid;

use crate::application::config::LinksConfig;
use crate::application::create_link::{CreateLinkInput, CreateLinkUseCase};
use crate::application::manage_links::{ManageLinksUseCase, UpdateLinkInput};
use crate::application::resolve_link::ResolveLinkUseCase;
use crate::domain::repository::{LinkRepository, ResolveOutcome};
use crate::error::LinkError;
use crate::presentation::dto::{
    CreateLinkRequest, LinkResponse, ListLinksResponse, UpdateLinkRequest,
};

/// Shared application state
pub struct LinksAppState<L>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<L>,
    pub config: Arc<LinksConfig>,
}

impl<L> Clone for LinksAppState<L>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<L> LinksAppState<L>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<L>, config: Arc<LinksConfig>) -> Self {
        Self { repo, config }
    }
}

// ============================================================================
// Management handlers (behind auth middleware)
// ============================================================================

/// POST /links
pub async fn create_link_handler<L>(
    State(state): State<LinksAppState<L>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, LinkError>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    let use_case = CreateLinkUseCase::new(state.repo.clone(), state.config.clone());
    let link = use_case
        .execute(
            principal.account_id,
            CreateLinkInput {
                custom_key: req.custom_key,
                target_url: req.target_url,
                expires_at_ms: req.expires_at_ms,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(LinkResponse::from(link))))
}

/// GET /links
pub async fn list_links_handler<L>(
    State(state): State<LinksAppState<L>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ListLinksResponse>, LinkError>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageLinksUseCase::new(state.repo.clone());
    let links = use_case.list(principal.account_id).await?;

    Ok(Json(ListLinksResponse {
        links: links.into_iter().map(LinkResponse::from).collect(),
    }))
}

/// GET /links/{id}
pub async fn get_link_handler<L>(
    State(state): State<LinksAppState<L>>,
    Extension(principal): Extension<Principal>,
    Path(link_id): Path<Uuid>,
) -> Result<Json<LinkResponse>, LinkError>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageLinksUseCase::new(state.repo.clone());
    let link = use_case
        .get(&ShortLinkId::from_uuid(link_id), principal.account_id)
        .await?;

    Ok(Json(LinkResponse::from(link)))
}

/// PATCH /links/{id}
pub async fn update_link_handler<L>(
    State(state): State<LinksAppState<L>>,
    Extension(principal): Extension<Principal>,
    Path(link_id): Path<Uuid>,
    Json(req): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, LinkError>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageLinksUseCase::new(state.repo.clone());
    let link = use_case
        .update(
            &ShortLinkId::from_uuid(link_id),
            principal.account_id,
            UpdateLinkInput {
                target_url: req.target_url,
                expires_at_ms: req.expires_at_ms,
                clear_expiry: req.clear_expiry,
            },
        )
        .await?;

    Ok(Json(LinkResponse::from(link)))
}

/// DELETE /links/{id}
pub async fn delete_link_handler<L>(
    State(state): State<LinksAppState<L>>,
    Extension(principal): Extension<Principal>,
    Path(link_id): Path<Uuid>,
) -> Result<StatusCode, LinkError>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    let use_case = ManageLinksUseCase::new(state.repo.clone());
    use_case
        .delete(&ShortLinkId::from_uuid(link_id), principal.account_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Redirect handler (public)
// ============================================================================

/// GET /{key}
///
/// 302 to the target for a live link, 404 for an unknown key, 410 for
/// an expired one.
pub async fn redirect_handler<L>(
    State(state): State<LinksAppState<L>>,
    Path(key): Path<String>,
) -> Result<Response, LinkError>
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    let use_case = ResolveLinkUseCase::new(state.repo.clone());

    match use_case.execute(&key).await? {
        ResolveOutcome::Hit(target) => Ok((
            StatusCode::FOUND,
            [(header::LOCATION, target.into_db())],
        )
            .into_response()),
        ResolveOutcome::Expired => Err(LinkError::Expired),
        ResolveOutcome::NotFound => Err(LinkError::NotFound),
    }
}
