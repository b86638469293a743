mod config;
mod errors;
mod extraction;
mod feedback;
mod interview;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;
mod voice_platform;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::voice_platform::VapiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mockboard API v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_secs(config.http_timeout_secs);

    // Document-understanding service
    let documents = GeminiClient::new(
        &config.gemini_base_url,
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        timeout,
    )?;
    info!("Document service initialized (model: {})", documents.model());

    // Voice-agent platform
    let voice = VapiClient::new(&config.vapi_base_url, config.vapi_api_key.clone(), timeout)?;
    info!("Voice platform client initialized ({})", config.vapi_base_url);

    if config.app_password.is_some() {
        info!("Access password required for /api routes");
    }

    let state = AppState::new(config.clone(), Arc::new(documents), Arc::new(voice));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the launcher page has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
