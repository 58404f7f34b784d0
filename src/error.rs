use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::playback::{ResourceId, SubmitError};
use crate::tts::ValidationError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A synthesis request is already in progress")]
    Busy,

    #[error("Audio resource {0} not found")]
    ResourceNotFound(ResourceId),

    #[error("No synthesized audio to play")]
    NothingToPlay,
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(e) => AppError::Validation(e),
            SubmitError::Busy => AppError::Busy,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, field) = match &self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", Some(e.field())),
            AppError::Busy => (StatusCode::CONFLICT, "BUSY", None),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND", None),
            AppError::NothingToPlay => (StatusCode::CONFLICT, "NOTHING_TO_PLAY", None),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {} - {}", code, message);
        } else {
            tracing::debug!("Request rejected: {} - {}", code, message);
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
                field: field.map(str::to_string),
            }),
        )
            .into_response()
    }
}
