use super::catalog::Catalog;
use super::SynthesisRequest;

/// Maximum text length accepted for a single synthesis, in characters
pub const MAX_TEXT_CHARS: usize = 10_000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a sound model to use")]
    NoModelSelected,

    #[error("Please enter some text for the model to speak")]
    EmptyText,

    #[error("Text too long (max {max} characters)")]
    TextTooLong { max: usize },
}

impl ValidationError {
    /// Form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NoModelSelected => "model",
            ValidationError::EmptyText | ValidationError::TextTooLong { .. } => "text",
        }
    }
}

/// Check a submission against the catalog and build the request to send.
///
/// An empty `selected_endpoint` or `raw_text` means the field was left blank.
/// The model is checked before the text.
pub fn validate(
    catalog: &Catalog,
    selected_endpoint: &str,
    raw_text: &str,
) -> Result<SynthesisRequest, ValidationError> {
    let model = match catalog.find_by_endpoint(selected_endpoint) {
        Some(model) if !selected_endpoint.is_empty() => model,
        _ => return Err(ValidationError::NoModelSelected),
    };

    let text = raw_text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ValidationError::TextTooLong {
            max: MAX_TEXT_CHARS,
        });
    }

    Ok(SynthesisRequest {
        model_endpoint: model.endpoint.clone(),
        text: text.to_string(),
        media_type: model.media_type.clone(),
    })
}
