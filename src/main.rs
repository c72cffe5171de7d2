//! Calpush - local offline proxy for the calendar client
//!
//! Runs the cache worker as an HTTP proxy in front of the calendar app.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calpush::api::{create_router, AppState};
use calpush::cache::CacheStorage;
use calpush::config::Config;
use calpush::worker::{HttpFetcher, LocalHost, WorkerContext, WorkerDriver};

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the worker and run install + activate
/// 4. Serve the proxy router on the configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calpush=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting calpush offline proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, port={}, precache={} urls, max_runtime_entries={}",
        config.upstream_origin,
        config.server_port,
        config.precache_urls.len(),
        config.max_runtime_entries
    );

    let ctx = WorkerContext::from_config(&config).context("invalid worker configuration")?;
    info!("Cache generation {}", ctx.cache_version);

    let fetcher = Arc::new(HttpFetcher::new(ctx.app_origin.clone()));
    let storage = Arc::new(RwLock::new(CacheStorage::new(config.max_runtime_entries)));
    let driver = Arc::new(WorkerDriver::new(ctx, storage, fetcher, Arc::new(LocalHost::new())));

    // Upstream may be down at boot; requests pass through until POST /sw/install succeeds
    match driver.start().await {
        Ok(state) => info!("Worker started in state {}", state),
        Err(e) => warn!("Worker install failed, serving pass-through: {}", e),
    }

    let app = create_router(AppState::new(driver));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Proxy listening on http://{}", addr);

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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
