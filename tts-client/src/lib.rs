//! Text-to-speech client library for the doc-audiobook workspace
//!
//! Provides a single interface over speech backends:
//! - Google Translate voice (regional English accents)
//! - Mock backend for tests

pub mod accent;
pub mod error;
pub mod provider;
pub mod providers;

pub use accent::Accent;
pub use error::{Result, TtsError};
pub use provider::{DEFAULT_LANGUAGE, SpeechAudio, SpeechBackend, SpeechRequest};
pub use providers::{BackendKind, GoogleTranslateProvider, MockBackend, get_backend};
