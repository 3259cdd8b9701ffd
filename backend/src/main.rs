//! HTTP server for the Folio content API, feeds and sitemap.

mod config;
mod handlers;
mod request_context;
mod routes;
mod seo;
mod state;

use anyhow::{Context, Result};
use folio_runtime::{init_logging, LoggingOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_logging(&LoggingOptions::new("folio-backend").with_env_log_dir())?;

    let config = config::ServerConfig::from_env();

    tracing::info!("Starting Folio backend server");
    tracing::info!("Content directory: {}", config.content_dir.display());
    tracing::info!("Site base URL: {}", config.site.base_url);
    if !config.content_dir.is_dir() {
        tracing::warn!(
            "Content directory {} does not exist; every listing will be empty",
            config.content_dir.display()
        );
    }

    let app_state = state::AppState::new(&config);
    let app = routes::create_router(app_state);

    let addr = config.listen_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
