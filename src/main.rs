mod config;
mod credentials;
mod error;
mod flash;
mod routes;
mod session;
mod state;
mod store;
mod views;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::credentials::CredentialStore;
use crate::session::SessionManager;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_web=info,tower_http=info")),
        )
        .init();

    let config = config::Config::from_env()?;

    let secret = match &config.session_secret {
        Some(secret) => secret.clone(),
        None => {
            warn!("SESSION_SECRET not set, sessions will not survive a restart");
            SessionManager::generate_secret()
        }
    };
    let sessions = SessionManager::new(&secret, config.session_ttl_hours);

    let state = match &config.database_url {
        Some(url) => {
            let store = Arc::new(
                PgStore::connect(url, config.max_connections)
                    .await
                    .context("Error connecting DB")?,
            );
            AppState {
                users: CredentialStore::new(store.clone()),
                tasks: store,
                sessions,
                backend: "postgres",
            }
        }
        None => {
            warn!("DATABASE_URL not set, keeping data in memory");
            AppState::in_memory(sessions)
        }
    };

    let app = routes::routes(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("could not bind {}", config.addr()))?;

    info!("server is chilling at http://{}", config.addr());

    axum::serve(listener, app).await?;

    Ok(())
}
