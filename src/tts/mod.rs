pub mod catalog;
pub mod client;
pub mod media;
pub mod validate;

use bytes::Bytes;

pub use catalog::{Catalog, CatalogError, SoundModel};
pub use client::{HttpSynthesisClient, SynthesisBackend, SynthesisError};
pub use validate::{validate, ValidationError, MAX_TEXT_CHARS};

/// A validated submission, built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub model_endpoint: String,
    /// Trimmed input text
    pub text: String,
    /// Media type configured on the chosen catalog entry
    pub media_type: Option<String>,
}

/// Audio returned by a successful synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Bytes,
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisResult {
    Pending,
    Ready(SynthesizedAudio),
    Failed(String),
}

impl From<Result<SynthesizedAudio, SynthesisError>> for SynthesisResult {
    fn from(result: Result<SynthesizedAudio, SynthesisError>) -> Self {
        match result {
            Ok(audio) => SynthesisResult::Ready(audio),
            Err(e) => SynthesisResult::Failed(e.to_string()),
        }
    }
}
