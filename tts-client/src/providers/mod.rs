//! Speech backend implementations

mod google_translate;
pub mod mock;

pub use google_translate::{GoogleTranslateProvider, MAX_REQUEST_CHARS, split_for_requests};
pub use mock::MockBackend;

use crate::error::Result;
use crate::provider::SpeechBackend;

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    GoogleTranslate,
}

/// Create the backend used for narration
pub fn get_backend(
    kind: BackendKind,
    client: Option<reqwest::Client>,
) -> Result<Box<dyn SpeechBackend>> {
    match kind {
        BackendKind::GoogleTranslate => match client {
            Some(client) => Ok(Box::new(GoogleTranslateProvider::with_client(client))),
            None => Ok(Box::new(GoogleTranslateProvider::new()?)),
        },
    }
}
