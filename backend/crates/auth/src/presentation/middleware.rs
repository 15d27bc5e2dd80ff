//! Auth Middleware
//!
//! Session-checking middleware for routes owned by other crates. On
//! success a [`kernel::principal::Principal`] is inserted into the
//! request extensions so downstream handlers know who is calling
//! without depending on this crate's domain types.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use kernel::principal::Principal;
use platform::client::{extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::entity::auth_session::AuthSession;
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthStore;

/// State for the auth middleware
pub struct AuthMiddlewareState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R>
where
    R: AuthStore,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthMiddlewareState<R>
where
    R: AuthStore,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

async fn resolve_session<R>(
    state: &AuthMiddlewareState<R>,
    headers: &HeaderMap,
    addr: Option<&SocketAddr>,
) -> AuthResult<AuthSession>
where
    R: AuthStore,
{
    let token = extract_cookie(headers, &state.config.session_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let ip = extract_client_ip(headers, addr.map(|a| a.ip()));
    let fp = extract_fingerprint(headers, ip)?;

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    use_case.get_session(&token, &fp.hash).await
}

/// Require a valid session; respond 401 otherwise
pub async fn require_auth_session<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: AuthStore,
{
    let addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);

    match resolve_session(&state, req.headers(), addr.as_ref()).await {
        Ok(session) => {
            let principal = Principal::new(
                session.account_id.into_uuid(),
                session.public_id.to_string(),
            );
            req.extensions_mut().insert(principal);
            Ok(next.run(req).await)
        }
        Err(e) => {
            e.log();
            Err(AuthError::SessionInvalid.into_response())
        }
    }
}

/// Attach the principal when a valid session is present, but let the
/// request through either way
pub async fn check_auth_session<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: AuthStore,
{
    let addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);

    if let Ok(session) = resolve_session(&state, req.headers(), addr.as_ref()).await {
        let principal = Principal::new(
            session.account_id.into_uuid(),
            session.public_id.to_string(),
        );
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}
