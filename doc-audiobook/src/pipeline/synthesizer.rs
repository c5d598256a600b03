//! Per-chunk speech synthesis with retry and exponential backoff.

use crate::audio::{AudioDecoder, AudioSegment};
use crate::text::TextChunk;
use std::time::Duration;
use thiserror::Error;
use tts_client::{Accent, SpeechBackend, SpeechRequest, TtsError};

/// Result of one synthesis attempt.
#[derive(Debug)]
pub enum SynthesisOutcome {
    Success(AudioSegment),
    /// The service asked us to slow down; worth trying again.
    RetryableFailure,
    FatalFailure(String),
}

/// Non-retryable synthesis failure for one chunk.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Speech synthesis failed for chunk {chunk_id}: {message}")]
    Fatal { chunk_id: usize, message: String },
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
        }
    }
}

/// Make a single synthesis call and classify the result.
pub async fn attempt_synthesis(
    backend: &dyn SpeechBackend,
    decoder: &dyn AudioDecoder,
    chunk: &TextChunk,
    accent: Accent,
) -> SynthesisOutcome {
    let request = SpeechRequest::new(chunk.text.clone(), accent);

    let audio = match backend.synthesize(&request).await {
        Ok(audio) => audio,
        Err(TtsError::RateLimited { .. }) => return SynthesisOutcome::RetryableFailure,
        Err(e) => return SynthesisOutcome::FatalFailure(e.to_string()),
    };

    match decoder.decode(&audio.bytes) {
        Ok(segment) => SynthesisOutcome::Success(segment),
        Err(e) => SynthesisOutcome::FatalFailure(e.to_string()),
    }
}

/// Synthesize one chunk, backing off while the service rate-limits us.
///
/// Returns `Ok(None)` once every attempt has been rate-limited; the caller
/// leaves the chunk out of the audiobook.
pub async fn synthesize_chunk(
    backend: &dyn SpeechBackend,
    decoder: &dyn AudioDecoder,
    chunk: &TextChunk,
    accent: Accent,
    policy: &RetryPolicy,
) -> Result<Option<AudioSegment>, SynthesisError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;

    for attempt in 1..=max_attempts {
        match attempt_synthesis(backend, decoder, chunk, accent).await {
            SynthesisOutcome::Success(segment) => return Ok(Some(segment)),
            SynthesisOutcome::FatalFailure(message) => {
                return Err(SynthesisError::Fatal {
                    chunk_id: chunk.chunk_id,
                    message,
                });
            }
            SynthesisOutcome::RetryableFailure if attempt < max_attempts => {
                log::warn!(
                    "Rate limited on chunk {} (attempt {}/{}), retrying in {:?}",
                    chunk.chunk_id,
                    attempt,
                    max_attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f32(policy.backoff_factor);
            }
            SynthesisOutcome::RetryableFailure => {}
        }
    }

    log::warn!(
        "Giving up on chunk {} after {} rate-limited attempts",
        chunk.chunk_id,
        max_attempts
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BytesDecoder;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;
    use tts_client::{MockBackend, SpeechAudio};

    /// Backend that rate-limits a fixed number of times and records when it was called.
    struct TimedBackend {
        rate_limits: usize,
        calls: Mutex<Vec<Instant>>,
    }

    impl TimedBackend {
        fn new(rate_limits: usize) -> Self {
            Self {
                rate_limits,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl SpeechBackend for TimedBackend {
        async fn synthesize(&self, _request: &SpeechRequest) -> tts_client::Result<SpeechAudio> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            if calls.len() <= self.rate_limits {
                Err(TtsError::RateLimited { retry_after: None })
            } else {
                Ok(SpeechAudio { bytes: vec![7, 7] })
            }
        }

        fn name(&self) -> &'static str {
            "timed"
        }
    }

    fn chunk() -> TextChunk {
        TextChunk::new(0, "Hello world.".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_with_backoff_then_succeeds() {
        let backend = TimedBackend::new(2);
        let segment = synthesize_chunk(
            &backend,
            &BytesDecoder,
            &chunk(),
            Accent::American,
            &RetryPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(segment.unwrap().samples(), &[7, 7]);
        assert_eq!(
            backend.gaps(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_skip_chunk() {
        let backend = MockBackend::always_fails(TtsError::RateLimited { retry_after: None });
        let started = Instant::now();

        let result = synthesize_chunk(
            &backend,
            &BytesDecoder,
            &chunk(),
            Accent::British,
            &RetryPolicy::default(),
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(backend.call_count(), 3);
        // 5s + 10s of backoff, nothing after the last attempt
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let backend = MockBackend::always_fails(TtsError::ApiError {
            message: "bad request".to_string(),
            status_code: Some(400),
        });

        let err = synthesize_chunk(
            &backend,
            &BytesDecoder,
            &chunk(),
            Accent::American,
            &RetryPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(backend.call_count(), 1);
        let SynthesisError::Fatal { chunk_id, message } = err;
        assert_eq!(chunk_id, 0);
        assert!(message.contains("bad request"));
    }

    #[tokio::test]
    async fn test_undecodable_audio_is_fatal() {
        let backend = MockBackend::always_succeeds(&[]);
        let outcome = attempt_synthesis(&backend, &BytesDecoder, &chunk(), Accent::Indian).await;
        assert!(matches!(outcome, SynthesisOutcome::FatalFailure(_)));
    }

    #[tokio::test]
    async fn test_attempt_classifies_rate_limit() {
        let backend = MockBackend::always_fails(TtsError::RateLimited {
            retry_after: Some(30),
        });
        let outcome = attempt_synthesis(&backend, &BytesDecoder, &chunk(), Accent::American).await;
        assert!(matches!(outcome, SynthesisOutcome::RetryableFailure));
        assert_eq!(backend.requests(), vec!["Hello world.".to_string()]);
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(5));
        assert_eq!(policy.backoff_factor, 2.0);
    }
}
