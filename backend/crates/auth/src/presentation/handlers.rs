//! HTTP Handlers
//!
//! Generic handlers over any repository bundle implementing
//! [`AuthStore`]. Use cases are constructed per request from the
//! shared state; handlers translate between DTOs and use-case
//! inputs/outputs and attach session cookies.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::cookie::{CookieConfig, extract_cookie};

use crate::application::{
    check_session::CheckSessionUseCase,
    config::AuthConfig,
    login::{LoginInput, LoginUseCase},
    logout::LogoutUseCase,
    notify::NotificationSender,
    password_reset::PasswordResetUseCase,
    register::{RegisterInput, RegisterUseCase},
    totp_setup::TotpSetupUseCase,
};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{
    AccountRepository, CredentialsRepository, PendingLoginRepository, ProfileRepository,
    ResetOtpRepository, SessionRepository, TwoFactorRepository,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, ResetCompleteRequest,
    ResetRequestRequest, ResetVerifyRequest, ResetVerifyResponse, SessionStatusResponse,
    TotpConfirmRequest, TotpConfirmResponse, TotpDisableRequest, TotpSetupResponse,
};

/// Everything the handlers need from a backing store
///
/// Blanket-implemented for any type that provides the full set of
/// repositories, such as `PgAuthRepository` and
/// `InMemoryAuthRepository`.
pub trait AuthStore:
    AccountRepository
    + ProfileRepository
    + CredentialsRepository
    + TwoFactorRepository
    + PendingLoginRepository
    + ResetOtpRepository
    + SessionRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: AccountRepository
        + ProfileRepository
        + CredentialsRepository
        + TwoFactorRepository
        + PendingLoginRepository
        + ResetOtpRepository
        + SessionRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared application state
pub struct AuthAppState<R, N>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    pub config: Arc<AuthConfig>,
}

impl<R, N> Clone for AuthAppState<R, N>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, N> AuthAppState<R, N>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, notifier: Arc<N>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn fingerprint(headers: &HeaderMap, addr: &SocketAddr) -> AuthResult<ClientFingerprint> {
    let ip = extract_client_ip(headers, Some(addr.ip()));
    Ok(extract_fingerprint(headers, ip)?)
}

fn session_cookie(config: &AuthConfig, max_age_secs: Option<i64>) -> CookieConfig {
    CookieConfig {
        name: config.session_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs,
    }
}

fn session_token_from(headers: &HeaderMap, config: &AuthConfig) -> AuthResult<String> {
    extract_cookie(headers, &config.session_cookie_name).ok_or(AuthError::SessionInvalid)
}

/// Resolve the current session or fail with 401
async fn current_session<R, N>(
    state: &AuthAppState<R, N>,
    headers: &HeaderMap,
    addr: &SocketAddr,
) -> AuthResult<AuthSession>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let token = session_token_from(headers, &state.config)?;
    let fp = fingerprint(headers, addr)?;
    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    use_case.get_session(&token, &fp.hash).await
}

// ============================================================================
// Account handlers
// ============================================================================

/// POST /register
pub async fn register_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(RegisterInput {
            user_name: req.user_name,
            email: req.email,
            phone: req.phone,
            full_name: req.full_name,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            public_id: output.public_id,
            user_name: output.user_name,
        }),
    ))
}

/// POST /login
pub async fn login_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let fp = fingerprint(&headers, &addr)?;
    let remember_me = req.remember_me;

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            LoginInput {
                user_name: req.user_name,
                password: req.password,
                remember_me,
                totp_code: req.totp_code,
            },
            fp,
        )
        .await?;

    if output.requires_2fa {
        // Password accepted, second factor outstanding; no cookie yet
        return Ok((
            StatusCode::PRECONDITION_REQUIRED,
            Json(LoginResponse {
                public_id: output.public_id,
                requires_2fa: true,
            }),
        )
            .into_response());
    }

    let max_age = if remember_me {
        Some(state.config.session_ttl_long.as_secs() as i64)
    } else {
        None
    };
    let cookie = session_cookie(&state.config, max_age).build_set_cookie(&output.session_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            public_id: output.public_id,
            requires_2fa: false,
        }),
    )
        .into_response())
}

/// POST /logout
pub async fn logout_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    // Clear the cookie even if the token no longer resolves
    let clear = session_cookie(&state.config, None).build_delete_cookie();

    if let Ok(token) = session_token_from(&headers, &state.config) {
        let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
        if let Err(e) = use_case.execute(&token).await {
            e.log();
        }
    }

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, clear)]))
}

/// GET /status
pub async fn status_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    match current_session(&state, &headers, &addr).await {
        Ok(session) => Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(session.public_id.to_string()),
            expires_at_ms: Some(session.expires_at_ms),
        }),
        Err(_) => Json(SessionStatusResponse {
            authenticated: false,
            public_id: None,
            expires_at_ms: None,
        }),
    }
}

// ============================================================================
// TOTP handlers
// ============================================================================

/// POST /totp/setup
pub async fn totp_setup_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<TotpSetupResponse>, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, &addr).await?;

    let use_case =
        TotpSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let output = use_case
        .begin(session.session_id, &session.account_id)
        .await?;

    Ok(Json(TotpSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /totp/confirm
pub async fn totp_confirm_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<TotpConfirmRequest>,
) -> Result<Json<TotpConfirmResponse>, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, &addr).await?;

    let use_case =
        TotpSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let backup_codes = use_case
        .confirm(session.session_id, &session.account_id, &req.code)
        .await?;

    Ok(Json(TotpConfirmResponse {
        backup_codes: backup_codes
            .into_iter()
            .map(|c| c.as_str().to_string())
            .collect(),
    }))
}

/// POST /totp/disable
pub async fn totp_disable_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<TotpDisableRequest>,
) -> Result<StatusCode, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let session = current_session(&state, &headers, &addr).await?;

    let use_case =
        TotpSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    use_case.disable(&session.account_id, &req.code).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Password reset handlers
// ============================================================================

fn password_reset_use_case<R, N>(
    state: &AuthAppState<R, N>,
) -> PasswordResetUseCase<R, R, R, R, N>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    PasswordResetUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    )
}

/// POST /password-reset/request
pub async fn reset_request_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ResetRequestRequest>,
) -> Result<StatusCode, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    password_reset_use_case(&state).request(&req.email).await?;

    // Same answer whether or not the email is registered
    Ok(StatusCode::ACCEPTED)
}

/// POST /password-reset/verify
pub async fn reset_verify_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ResetVerifyRequest>,
) -> Result<Json<ResetVerifyResponse>, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    let reset_token = password_reset_use_case(&state)
        .verify(&req.email, &req.code)
        .await?;

    Ok(Json(ResetVerifyResponse { reset_token }))
}

/// POST /password-reset/complete
pub async fn reset_complete_handler<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ResetCompleteRequest>,
) -> Result<StatusCode, AuthError>
where
    R: AuthStore,
    N: NotificationSender + Clone + Send + Sync + 'static,
{
    password_reset_use_case(&state)
        .complete(&req.reset_token, req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
