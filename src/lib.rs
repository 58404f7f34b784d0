//! Text-to-speech studio.
//!
//! A user picks one of a fixed set of hosted synthesis models, submits text,
//! and gets back audio to play. [`tts`] validates the submission and talks to
//! the synthesis backend; [`playback`] owns the idle/loading/result state and
//! the audio buffers derived from it; [`api`] exposes both over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod playback;
pub mod tts;
