//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors go through
//! `auth::AuthError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::domain::repository::{AccountRepository, SessionStore};
use auth::{
    AuthConfig, MemoryAccountStore, MemorySessionStore, PgAccountStore, PgSessionStore,
    SessionBinder, auth_router,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userauth_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let auth_config = Arc::new(config.auth.clone());

    let auth_routes = match &config.database {
        Some(database) => {
            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            stores_router(
                Arc::new(PgAccountStore::new(pool.clone())),
                Arc::new(PgSessionStore::new(pool)),
                auth_config,
                &config,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts and sessions live in memory");

            stores_router(
                Arc::new(MemoryAccountStore::new()),
                Arc::new(MemorySessionStore::new()),
                auth_config,
                &config,
            )
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Auth routes over the chosen stores, plus the expired-session sweeper
fn stores_router<A, S>(
    accounts: Arc<A>,
    sessions: Arc<S>,
    auth_config: Arc<AuthConfig>,
    config: &ServerConfig,
) -> Router
where
    A: AccountRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    spawn_session_purge(
        SessionBinder::new(sessions.clone(), auth_config.clone()),
        config.session_purge_interval,
    );

    auth_router(accounts, sessions, auth_config)
}

/// First sweep runs at startup; failures never stop the server
fn spawn_session_purge<S>(binder: SessionBinder<S>, every: std::time::Duration)
where
    S: SessionStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        // interval() panics on zero
        let mut interval = tokio::time::interval(every.max(std::time::Duration::from_secs(1)));
        loop {
            interval.tick().await;
            if let Err(e) = binder.purge_expired().await {
                tracing::warn!(error = %e, "Session purge failed, continuing anyway");
            }
        }
    });
}
