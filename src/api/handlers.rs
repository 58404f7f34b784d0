use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{GenerateRequest, GenerateResponse, HealthResponse, ModelsResponse};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::playback::{PlaybackSnapshot, ResourceId};

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let submission = state
        .controller
        .submit(
            request.model_url.as_deref().unwrap_or_default(),
            request.text.as_deref().unwrap_or_default(),
        )
        .await?;

    // The task runs on its own; clients follow progress through /state
    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            ticket: submission.ticket,
        }),
    ))
}

pub async fn current_state(State(state): State<Arc<AppState>>) -> Json<PlaybackSnapshot> {
    Json(state.controller.snapshot())
}

pub async fn clear_state(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controller.clear().await;
    StatusCode::NO_CONTENT
}

pub async fn audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let id = ResourceId::new(id);
    let audio = state
        .controller
        .audio(id)
        .ok_or(AppError::ResourceNotFound(id))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, audio.media_type)],
        audio.bytes,
    )
        .into_response())
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.controller.catalog().list().to_vec(),
    })
}

#[cfg(feature = "audio-playback")]
pub async fn play(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    let audio = state
        .controller
        .current_audio()
        .await
        .ok_or(AppError::NothingToPlay)?;

    // Play audio in a background task
    tokio::task::spawn_blocking(move || {
        if let Err(e) = play_audio(audio.bytes) {
            tracing::error!("Failed to play audio: {}", e);
        }
    });

    Ok(StatusCode::ACCEPTED)
}

#[cfg(feature = "audio-playback")]
fn play_audio(bytes: bytes::Bytes) -> Result<(), Box<dyn std::error::Error>> {
    let (_stream, stream_handle) = rodio::OutputStream::try_default()?;
    let sink = rodio::Sink::try_new(&stream_handle)?;
    sink.append(rodio::Decoder::new(std::io::Cursor::new(bytes))?);
    sink.sleep_until_end();

    Ok(())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
