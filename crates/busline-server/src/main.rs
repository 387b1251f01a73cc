//! Busline server - bus network catalog with session authentication
//!
//! Exposes read access to the cities and routes collections plus
//! username/password registration, login, and logout backed by MongoDB.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use busline_server::config::Config;
use busline_server::routes::build_router;
use busline_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "busline_server=info,busline=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting busline server on {}:{}", config.host, config.port);

    // The database handle is established lazily by the first request that
    // needs it, so startup does not require a reachable database.
    let state = Arc::new(AppState::new(config.clone()));

    let app = build_router(state);

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
