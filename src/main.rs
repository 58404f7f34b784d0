use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tts_studio::api::routes::{create_router, AppState};
use tts_studio::config::StudioConfig;
use tts_studio::playback::PlaybackController;
use tts_studio::tts::{Catalog, HttpSynthesisClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment
    let config = StudioConfig::from_env()?;
    let addr = config.addr()?;

    tracing::info!("TTS Studio v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Synthesis backend: {}", config.synthesis_url);

    let catalog = match &config.catalog_path {
        Some(path) => {
            tracing::info!("Loading model catalog from {}", path.display());
            Catalog::from_path(path)?
        }
        None => Catalog::builtin(),
    };
    tracing::info!("{} models available", catalog.len());

    let client = HttpSynthesisClient::new(config.synthesis_url.clone())?;

    let controller = PlaybackController::new(Arc::new(catalog), Arc::new(client))
        .with_timeout(config.synthesis_timeout())
        .with_policy(config.in_flight);

    // Create app state
    let state = Arc::new(AppState {
        controller: Arc::new(controller),
    });

    // Create router
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
