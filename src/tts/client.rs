use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::Client;
use serde::Serialize;

use super::media::resolve_media_type;
use super::{SynthesisRequest, SynthesisResult, SynthesizedAudio};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("Synthesis backend rejected the request (HTTP {0})")]
    BackendRejected(u16),

    #[error("Synthesis request failed: {0}")]
    Transport(String),

    #[error("Synthesis timed out after {} seconds", .0.as_secs_f32())]
    Timeout(Duration),
}

/// Something that turns a validated request into audio.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError>;

    /// Same call, folded into a [`SynthesisResult`].
    async fn synthesize_result(&self, request: &SynthesisRequest) -> SynthesisResult {
        self.synthesize(request).await.into()
    }
}

/// Body sent to the backend. Field names are fixed by the backend.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisBody<'a> {
    input: &'a str,
    model_url: &'a str,
}

/// Synthesis backend reached over HTTP.
pub struct HttpSynthesisClient {
    client: Client,
    url: String,
}

impl HttpSynthesisClient {
    pub fn new(url: impl Into<String>) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SynthesisError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SynthesisBackend for HttpSynthesisClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        let body = SynthesisBody {
            input: &request.text,
            model_url: &request.model_endpoint,
        };

        tracing::debug!(
            "POST {} model={} chars={}",
            self.url,
            request.model_endpoint,
            request.text.chars().count()
        );

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::BackendRejected(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await.map_err(transport_error)?;

        let media_type = resolve_media_type(
            request.media_type.as_deref(),
            content_type.as_deref(),
            &bytes,
        );

        tracing::debug!("Received {} bytes of {}", bytes.len(), media_type);

        Ok(SynthesizedAudio { bytes, media_type })
    }
}

fn transport_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::Timeout(CONNECT_TIMEOUT)
    } else {
        SynthesisError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_field_names() {
        let body = SynthesisBody {
            input: "hello",
            model_url: "https://api/a",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"input": "hello", "modelUrl": "https://api/a"})
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SynthesisError::BackendRejected(503).to_string(),
            "Synthesis backend rejected the request (HTTP 503)"
        );
        assert_eq!(
            SynthesisError::Timeout(Duration::from_millis(1500)).to_string(),
            "Synthesis timed out after 1.5 seconds"
        );
    }
}
