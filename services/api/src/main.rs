use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod routes;
mod state;

use common::config::AppConfig;
use tokio::net::TcpListener;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting astro feed service");

    let config = AppConfig::from_env()?;
    if !config.translation_enabled() {
        warn!("DEEPL_API_KEY is not set; feeds are served untranslated");
    }
    info!(
        "Configuration loaded: port {}, translation enabled {} (target {}), allowed origins {:?}",
        config.port,
        config.translation_enabled(),
        config.translation_target_lang,
        config.allowed_origins
    );

    let app_state = AppState::from_config(&config)?;

    let app = routes::create_router(app_state)
        .layer(middleware::cors_layer(&config))
        .layer(middleware::trace_layer());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Astro feed service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Astro feed service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
