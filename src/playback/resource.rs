use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use serde::Serialize;

use crate::tts::media::wav_duration;
use crate::tts::SynthesizedAudio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a playable audio buffer held by a [`ResourceStore`].
///
/// Handles are not `Clone`: whoever holds one is responsible for giving it
/// back through [`ResourceStore::release`], which consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct AudioResource {
    id: ResourceId,
    media_type: String,
    byte_len: usize,
    duration: Option<Duration>,
}

impl AudioResource {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Where the presentation layer fetches the bytes from
    pub fn url(&self) -> String {
        format!("/api/audio/{}", self.id)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

/// Owns the decoded audio buffers behind live [`AudioResource`] handles.
#[derive(Default)]
pub struct ResourceStore {
    buffers: RwLock<HashMap<ResourceId, SynthesizedAudio>>,
    next_id: AtomicU64,
    created: AtomicUsize,
    released: AtomicUsize,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, audio: SynthesizedAudio) -> AudioResource {
        let id = ResourceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let resource = AudioResource {
            id,
            media_type: audio.media_type.clone(),
            byte_len: audio.bytes.len(),
            duration: wav_duration(&audio.bytes),
        };

        self.buffers.write().unwrap().insert(id, audio);
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Created audio resource {} ({} bytes)", id, resource.byte_len);

        resource
    }

    pub fn release(&self, resource: AudioResource) {
        let removed = self.buffers.write().unwrap().remove(&resource.id);
        if removed.is_some() {
            self.released.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Released audio resource {}", resource.id);
        } else {
            tracing::warn!("Audio resource {} was already released", resource.id);
        }
    }

    /// Bytes behind a live handle.
    pub fn get(&self, id: ResourceId) -> Option<SynthesizedAudio> {
        self.buffers.read().unwrap().get(&id).cloned()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    pub fn live(&self) -> usize {
        self.buffers.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn audio(bytes: &'static [u8]) -> SynthesizedAudio {
        SynthesizedAudio {
            bytes: Bytes::from_static(bytes),
            media_type: "audio/mpeg".into(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = ResourceStore::new();
        let resource = store.create(audio(&[1, 2, 3]));

        assert_eq!(resource.byte_len(), 3);
        assert_eq!(resource.media_type(), "audio/mpeg");
        assert_eq!(resource.duration(), None);
        assert_eq!(resource.url(), format!("/api/audio/{}", resource.id()));

        let stored = store.get(resource.id()).unwrap();
        assert_eq!(stored.bytes.as_ref(), &[1, 2, 3]);
        assert_eq!(store.live(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = ResourceStore::new();
        let a = store.create(audio(&[1]));
        let b = store.create(audio(&[2]));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_release() {
        let store = ResourceStore::new();
        let resource = store.create(audio(&[1]));
        let id = resource.id();

        store.release(resource);

        assert!(store.get(id).is_none());
        assert_eq!(store.created(), 1);
        assert_eq!(store.released(), 1);
        assert_eq!(store.live(), 0);
    }
}
