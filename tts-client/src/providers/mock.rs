//! Mock speech backend for testing
//!
//! Provides a configurable mock backend that can simulate rate limiting,
//! hard failures, and successful responses.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::provider::{SpeechAudio, SpeechBackend, SpeechRequest};

/// A mock backend for testing retry and skip behavior
pub struct MockBackend {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: usize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Option<TtsError>,
    /// Audio bytes to return on success
    audio: Vec<u8>,
    /// Texts received, in call order
    requests: Mutex<Vec<String>>,
    /// Backend name for display
    name: &'static str,
}

impl MockBackend {
    /// Create a backend that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: TtsError, audio: &[u8]) -> Self {
        Self {
            fail_count: n,
            call_count: AtomicUsize::new(0),
            fail_with: Some(error),
            audio: audio.to_vec(),
            requests: Mutex::new(Vec::new()),
            name: "mock",
        }
    }

    /// Create a backend that always fails with the given error
    pub fn always_fails(error: TtsError) -> Self {
        Self::fails_then_succeeds(usize::MAX, error, &[])
    }

    /// Create a backend that always succeeds
    pub fn always_succeeds(audio: &[u8]) -> Self {
        Self {
            fail_count: 0,
            call_count: AtomicUsize::new(0),
            fail_with: None,
            audio: audio.to_vec(),
            requests: Mutex::new(Vec::new()),
            name: "mock",
        }
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts passed to synthesize(), in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Set a custom backend name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.text.clone());
        }

        if call_num < self.fail_count {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
        }

        Ok(SpeechAudio {
            bytes: self.audio.clone(),
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
