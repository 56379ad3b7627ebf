//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AccountRepository, SessionStore};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_session;

/// Create the Auth router for any store implementations
///
/// Mount under `/api/auth`.
pub fn auth_router<A, S>(accounts: Arc<A>, sessions: Arc<S>, config: Arc<AuthConfig>) -> Router
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let state = AuthAppState {
        accounts,
        sessions,
        config,
    };

    Router::new()
        .route("/register", post(handlers::register::<A, S>))
        .route("/login", post(handlers::login::<A, S>))
        .route(
            "/me",
            get(handlers::me::<A, S>).route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_session::<A, S>,
            )),
        )
        .route("/logout", post(handlers::logout::<A, S>))
        .with_state(state)
}
