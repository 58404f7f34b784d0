pub mod handlers;
pub mod routes;

use serde::{Deserialize, Serialize};

use crate::playback::Ticket;
use crate::tts::SoundModel;

/// Form submission. Missing fields count as left blank.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub model_url: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub ticket: Ticket,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<SoundModel>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
