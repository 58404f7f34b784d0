use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// A hosted synthesis model the user can pick from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundModel {
    pub name: String,
    pub endpoint: String,
    /// Audio media type the model is known to produce. When absent the
    /// client negotiates it from the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl SoundModel {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog is empty")]
    Empty,

    #[error("Duplicate model name: {0}")]
    DuplicateName(String),

    #[error("Model entry {0} has a blank name or endpoint")]
    BlankEntry(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const HF_INFERENCE: &str = "https://api-inference.huggingface.co/models";

/// Immutable, ordered list of the models offered to the user.
#[derive(Debug, Clone)]
pub struct Catalog {
    models: Vec<SoundModel>,
}

impl Catalog {
    pub fn new(models: Vec<SoundModel>) -> Result<Self, CatalogError> {
        if models.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut names = HashSet::new();
        for (index, model) in models.iter().enumerate() {
            if model.name.trim().is_empty() || model.endpoint.trim().is_empty() {
                return Err(CatalogError::BlankEntry(index));
            }
            if !names.insert(model.name.as_str()) {
                return Err(CatalogError::DuplicateName(model.name.clone()));
            }
        }

        Ok(Self { models })
    }

    /// The compiled-in model list.
    pub fn builtin() -> Self {
        let models = [
            ("MMS English", "facebook/mms-tts-eng"),
            ("MMS French", "facebook/mms-tts-fra"),
            ("MMS German", "facebook/mms-tts-deu"),
            ("SpeechT5", "microsoft/speecht5_tts"),
            ("Bark Small", "suno/bark-small"),
            ("LJSpeech VITS", "espnet/kan-bayashi_ljspeech_vits"),
        ]
        .into_iter()
        .map(|(name, id)| SoundModel::new(name, format!("{}/{}", HF_INFERENCE, id)))
        .collect();

        Self { models }
    }

    /// Load a JSON array of models, replacing the built-in list.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let models: Vec<SoundModel> = serde_json::from_reader(File::open(path)?)?;
        Self::new(models)
    }

    pub fn list(&self) -> &[SoundModel] {
        &self.models
    }

    pub fn find_by_endpoint(&self, endpoint: &str) -> Option<&SoundModel> {
        self.models.iter().find(|m| m.endpoint == endpoint)
    }

    pub fn contains_endpoint(&self, endpoint: &str) -> bool {
        self.find_by_endpoint(endpoint).is_some()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
