//! Link Routers
//!
//! Two routers: the authenticated management API and the public
//! redirect endpoint. The management router must be layered with the
//! auth crate's session middleware by the composing application.

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::repository::LinkRepository;
use crate::infra::postgres::PgLinkRepository;
use crate::presentation::handlers::{
    LinksAppState, create_link_handler, delete_link_handler, get_link_handler,
    list_links_handler, redirect_handler, update_link_handler,
};

/// Build the management router backed by PostgreSQL
pub fn links_router(state: LinksAppState<PgLinkRepository>) -> Router {
    links_router_generic(state)
}

/// Build the management router for any backing store (used by tests)
pub fn links_router_generic<L>(state: LinksAppState<L>) -> Router
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(create_link_handler::<L>).get(list_links_handler::<L>))
        .route(
            "/{id}",
            get(get_link_handler::<L>)
                .patch(update_link_handler::<L>)
                .delete(delete_link_handler::<L>),
        )
        .with_state(state)
}

/// Build the public redirect router backed by PostgreSQL
pub fn redirect_router(state: LinksAppState<PgLinkRepository>) -> Router {
    redirect_router_generic(state)
}

/// Build the public redirect router for any backing store
pub fn redirect_router_generic<L>(state: LinksAppState<L>) -> Router
where
    L: LinkRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/{key}", get(redirect_handler::<L>))
        .with_state(state)
}
