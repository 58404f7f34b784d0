use std::io::Cursor;
use std::time::Duration;

use hound::WavReader;

/// Media type assumed when nothing else identifies the payload.
pub const DEFAULT_MEDIA_TYPE: &str = "audio/mpeg";

/// Decide the media type for a synthesized payload.
///
/// Precedence: the type configured on the catalog entry, then an `audio/*`
/// response `Content-Type`, then magic-byte sniffing, then [`DEFAULT_MEDIA_TYPE`].
pub fn resolve_media_type(configured: Option<&str>, header: Option<&str>, bytes: &[u8]) -> String {
    if let Some(configured) = configured.filter(|c| !c.trim().is_empty()) {
        return configured.trim().to_string();
    }

    if let Some(essence) = header.and_then(audio_essence) {
        return essence;
    }

    if let Some(sniffed) = sniff(bytes) {
        return sniffed.to_string();
    }

    tracing::debug!(
        "Could not identify audio payload ({} bytes), assuming {}",
        bytes.len(),
        DEFAULT_MEDIA_TYPE
    );
    DEFAULT_MEDIA_TYPE.to_string()
}

// "audio/flac; charset=binary" -> "audio/flac"; non-audio types are ignored
fn audio_essence(header: &str) -> Option<String> {
    let essence = header.split(';').next()?.trim().to_ascii_lowercase();
    if essence.starts_with("audio/") && essence.len() > "audio/".len() {
        Some(essence)
    } else {
        None
    }
}

/// Identify common audio containers from their leading bytes.
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some("audio/wav"),
        [b'f', b'L', b'a', b'C', ..] => Some("audio/flac"),
        [b'O', b'g', b'g', b'S', ..] => Some("audio/ogg"),
        [b'I', b'D', b'3', ..] => Some("audio/mpeg"),
        // ADTS frame sync with layer bits 00
        [0xFF, b, ..] if b & 0xF6 == 0xF0 => Some("audio/aac"),
        [0xFF, b, ..] if b & 0xE0 == 0xE0 => Some("audio/mpeg"),
        _ => None,
    }
}

/// Playback length of a WAV payload. `None` for anything hound can't parse.
pub fn wav_duration(bytes: &[u8]) -> Option<Duration> {
    let reader = WavReader::new(Cursor::new(bytes)).ok()?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return None;
    }
    let frames = reader.duration() as f64;
    Some(Duration::from_secs_f64(frames / sample_rate as f64))
}
