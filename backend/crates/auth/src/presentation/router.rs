//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::notify::{NotificationSender, TracingNotifier};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{
    AuthAppState, AuthStore, login_handler, logout_handler, register_handler,
    reset_complete_handler, reset_request_handler, reset_verify_handler, status_handler,
    totp_confirm_handler, totp_disable_handler, totp_setup_handler,
};

/// Build the auth router backed by PostgreSQL
pub fn auth_router(state: AuthAppState<PgAuthRepository, TracingNotifier>) -> Router {
    auth_router_generic(state)
}

/// Build the auth router for any backing store (used by tests)
pub fn auth_router_generic<R, N>(state: AuthAppState<R, N>) -> Router
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(register_handler::<R, N>))
        .route("/login", post(login_handler::<R, N>))
        .route("/logout", post(logout_handler::<R, N>))
        .route("/status", get(status_handler::<R, N>))
        .route("/totp/setup", post(totp_setup_handler::<R, N>))
        .route("/totp/confirm", post(totp_confirm_handler::<R, N>))
        .route("/totp/disable", post(totp_disable_handler::<R, N>))
        .route("/password-reset/request", post(reset_request_handler::<R, N>))
        .route("/password-reset/verify", post(reset_verify_handler::<R, N>))
        .route(
            "/password-reset/complete",
            post(reset_complete_handler::<R, N>),
        )
        .with_state(state)
}
