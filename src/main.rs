//! Movies Search - A movie search server with a cached title search
//!
//! Serves movie lookups by id and title searches over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movies_search::api::create_router;
use movies_search::store::{Collection, Query, MOVIES_COLLECTION};
use movies_search::{AppState, Config};

/// Main entry point for the movies search server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the movies collection and create its indexes
/// 4. Create the movies service and its search cache
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movies_search=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Movies Search Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: search_cache_capacity={}, max_movies_per_search={}, port={}, data_path={}",
        config.search_cache_capacity,
        config.max_movies_per_search,
        config.server_port,
        config.data_path.display()
    );

    let collection = match Collection::load(MOVIES_COLLECTION, &config.data_path).await {
        Ok(collection) => collection,
        Err(err) => {
            warn!(
                "Could not load movies from {}: {}. Starting with an empty collection",
                config.data_path.display(),
                err
            );
            Collection::new(MOVIES_COLLECTION)
        }
    }
    .into_shared();
    Query::new(collection.clone()).ensure_indexes().await;

    let state = AppState::from_config(&config, collection);
    info!("Movies service initialized");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
