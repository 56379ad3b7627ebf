//! Auth Middleware
//!
//! Middleware for requiring authentication on protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::repository::{AccountRepository, SessionStore};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Resolve the session cookie and expose the [`SessionIdentity`] to the
/// handler, or answer 401
///
/// [`SessionIdentity`]: crate::domain::entity::SessionIdentity
pub async fn require_session<A, S>(
    State(state): State<AuthAppState<A, S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let handle = state
        .presented_handle(req.headers())
        .ok_or(AuthError::Unauthenticated)?;

    let identity = state
        .binder()
        .resolve(&handle)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
