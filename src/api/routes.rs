use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::playback::PlaybackController;

pub struct AppState {
    pub controller: Arc<PlaybackController>,
}

pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/generate", post(handlers::generate))
        .route(
            "/state",
            get(handlers::current_state).delete(handlers::clear_state),
        )
        .route("/audio/:id", get(handlers::audio))
        .route("/models", get(handlers::list_models))
        .route("/health", get(handlers::health));

    #[cfg(feature = "audio-playback")]
    let api_routes = api_routes.route("/play", post(handlers::play));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
