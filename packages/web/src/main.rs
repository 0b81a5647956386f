use std::sync::Arc;

use anyhow::Context;
use pam_api::auth::GoTrueClient;
use pam_api::db::{self, PgProfileStore};
use pam_api::AppConfig;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::EnvFilter;

use state::AppState;

mod error;
mod handlers;
mod origin;
mod routes;
mod state;
mod verifier;

const DEFAULT_LOG_FILTER: &str = "info,pam_web=debug,pam_api=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.google_client_id.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID not set, Google Calendar connect is disabled");
    }
    if config.microsoft_client_id.is_none() {
        tracing::warn!("MICROSOFT_CLIENT_ID not set, Outlook Calendar connect is disabled");
    }

    // Initialize database pool
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;
    let pool = db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    // Create session store
    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .context("Failed to migrate session store")?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.app_url.scheme() == "https")
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    let identity = GoTrueClient::from_config(&config).context("Failed to create auth client")?;
    let profiles = PgProfileStore::new(pool);

    let addr = config.bind_address.clone();
    let debug_endpoints = config.debug_endpoints;
    let state = AppState::new(config, Arc::new(identity), Arc::new(profiles));
    let app = routes::router(state).layer(session_layer);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, debug_endpoints, "Server listening");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
