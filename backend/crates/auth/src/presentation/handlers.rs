//! HTTP Handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountLookupUseCase, AuthenticateInput, AuthenticateUseCase, RegisterInput, RegisterUseCase,
    SessionBinder,
};
use crate::domain::entity::{Account, SessionIdentity};
use crate::domain::repository::{AccountRepository, SessionStore};
use crate::domain::value_object::SessionHandle;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest};

/// Shared state for auth handlers
pub struct AuthAppState<A, S> {
    pub accounts: Arc<A>,
    pub sessions: Arc<S>,
    pub config: Arc<AuthConfig>,
}

// Stores need not be Clone themselves
impl<A, S> Clone for AuthAppState<A, S> {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            sessions: self.sessions.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A, S> AuthAppState<A, S>
where
    A: AccountRepository,
    S: SessionStore,
{
    pub fn binder(&self) -> SessionBinder<S> {
        SessionBinder::new(self.sessions.clone(), self.config.clone())
    }

    /// Handle carried by the request cookie, unverified
    pub(crate) fn presented_handle(&self, headers: &HeaderMap) -> Option<SessionHandle> {
        platform::cookie::extract_cookie(headers, &self.config.session_cookie_name)
            .map(SessionHandle::from_client)
    }

    /// Drop any session the client already holds, then bind a fresh one
    async fn rebind(&self, headers: &HeaderMap, account: &Account) -> AuthResult<SessionHandle> {
        let binder = self.binder();

        if let Some(previous) = self.presented_handle(headers) {
            binder.invalidate(&previous).await?;
        }

        binder.bind(account.id, account.username.clone()).await
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<A, S>(
    State(state): State<AuthAppState<A, S>>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<Response>
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let use_case = RegisterUseCase::new(state.accounts.clone(), state.config.clone());
    let account = use_case
        .execute(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
        })
        .await?;

    // Registration logs the new account straight in
    let handle = state.rebind(&headers, &account).await?;

    session_response(
        &state.config,
        StatusCode::CREATED,
        &handle,
        AuthResponse::with_user("User registered successfully", &account),
    )
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<A, S>(
    State(state): State<AuthAppState<A, S>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Response>
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    // Every login failure is a 401, including an unreadable body
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Unreadable login request");
        AuthError::LoginRejected
    })?;

    let use_case = AuthenticateUseCase::new(state.accounts.clone(), state.config.clone());
    let result = use_case
        .execute(AuthenticateInput {
            username: req.username,
            password: req.password,
        })
        .await;

    let account = match result {
        Err(AuthError::UserNotFound | AuthError::InvalidCredentials)
            if state.config.mask_login_failures =>
        {
            return Err(AuthError::LoginRejected);
        }
        other => other?,
    };

    let handle = state.rebind(&headers, &account).await?;

    session_response(
        &state.config,
        StatusCode::OK,
        &handle,
        AuthResponse::with_user("User logged in successfully", &account),
    )
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me (behind `require_session`)
pub async fn me<A, S>(
    State(state): State<AuthAppState<A, S>>,
    Extension(identity): Extension<SessionIdentity>,
) -> AuthResult<Json<AuthResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let account = AccountLookupUseCase::new(state.accounts.clone())
        .get_by_id(identity.account_id)
        .await?;

    Ok(Json(AuthResponse::with_user(
        "User retrieved successfully",
        &account,
    )))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Always succeeds and clears the cookie, whatever the session state.
pub async fn logout<A, S>(
    State(state): State<AuthAppState<A, S>>,
    headers: HeaderMap,
) -> Response
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    if let Some(handle) = state.presented_handle(&headers) {
        if let Err(e) = state.binder().invalidate(&handle).await {
            tracing::warn!(error = %e, "Session invalidation failed during logout");
        }
    }

    let body = Json(AuthResponse::ack("User logged out successfully"));

    match state.config.cookie_config().delete_header() {
        Some(cookie) => (StatusCode::OK, [(header::SET_COOKIE, cookie)], body).into_response(),
        None => (StatusCode::OK, body).into_response(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn session_response(
    config: &AuthConfig,
    status: StatusCode,
    handle: &SessionHandle,
    body: AuthResponse,
) -> AuthResult<Response> {
    let cookie = config
        .cookie_config()
        .set_header(handle.as_str())
        .ok_or_else(|| AuthError::Internal("Session cookie is not a valid header".to_string()))?;

    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}
