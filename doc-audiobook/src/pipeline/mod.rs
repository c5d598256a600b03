//! Narration pipeline: chunk the text, synthesize each chunk, assemble and encode.

pub mod synthesizer;

pub use synthesizer::{RetryPolicy, SynthesisError, synthesize_chunk};

use crate::audio::{AudioDecoder, AudioEncoder, AudioError, AudioSegment, assemble};
use crate::session::Audiobook;
use crate::text::{DEFAULT_MAX_CHUNK_SIZE, TextChunk, is_speakable, split_into_chunks};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tts_client::{Accent, SpeechBackend};

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No text found to convert")]
    EmptyText,

    #[error("No audio was produced; every chunk failed")]
    NoAudio,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// What to do when a chunk fails for a reason other than rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run
    #[default]
    Abort,
    /// Leave the chunk out and keep going
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("Unknown failure policy: {} (expected abort or skip)", other)),
        }
    }
}

/// Tunables for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub accent: Accent,
    pub chunk_size: usize,
    pub retry: RetryPolicy,
    pub on_error: FailurePolicy,
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            accent: Accent::default(),
            chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            retry: RetryPolicy::default(),
            on_error: FailurePolicy::default(),
            show_progress: true,
        }
    }
}

/// Converts narration text into an encoded audiobook.
pub struct Pipeline {
    backend: Box<dyn SpeechBackend>,
    decoder: Box<dyn AudioDecoder>,
    encoder: Box<dyn AudioEncoder>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        backend: Box<dyn SpeechBackend>,
        decoder: Box<dyn AudioDecoder>,
        encoder: Box<dyn AudioEncoder>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            backend,
            decoder,
            encoder,
            options,
        }
    }

    /// File extension of the audiobooks this pipeline produces.
    pub fn extension(&self) -> &'static str {
        self.encoder.extension()
    }

    /// Narrate `text` into an audiobook named `filename`.
    ///
    /// Chunks are synthesized one at a time, in order. Chunks with nothing to
    /// pronounce (scene breaks such as `* * *`) are left out up front. Chunks
    /// that stay rate-limited are skipped; other failures follow the failure
    /// policy.
    pub async fn generate(&self, text: &str, filename: &str) -> Result<Audiobook, PipelineError> {
        let chunks: Vec<TextChunk> = split_into_chunks(text, self.options.chunk_size)
            .into_iter()
            .filter(|chunk| {
                let speakable = is_speakable(&chunk.text);
                if !speakable {
                    log::debug!("Leaving out chunk {}: nothing to narrate", chunk.chunk_id);
                }
                speakable
            })
            .collect();
        if chunks.is_empty() {
            return Err(PipelineError::EmptyText);
        }

        let total = chunks.len();
        log::info!(
            "Synthesizing {} chunks with {} ({})",
            total,
            self.backend.name(),
            self.options.accent
        );

        let pb = self.progress_bar(total);
        let mut segments: Vec<Option<AudioSegment>> = Vec::with_capacity(total);
        let mut skipped = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            pb.set_message(format!("chunk {}/{}", i + 1, total));

            let result = synthesize_chunk(
                self.backend.as_ref(),
                self.decoder.as_ref(),
                chunk,
                self.options.accent,
                &self.options.retry,
            )
            .await;

            match result {
                Ok(Some(segment)) => segments.push(Some(segment)),
                Ok(None) => {
                    pb.suspend(|| {
                        log::warn!("Skipping chunk {}: still rate limited", chunk.chunk_id)
                    });
                    skipped += 1;
                    segments.push(None);
                }
                Err(e) => match self.options.on_error {
                    FailurePolicy::Abort => {
                        pb.abandon();
                        return Err(e.into());
                    }
                    FailurePolicy::Skip => {
                        pb.suspend(|| log::warn!("Skipping chunk {}: {}", chunk.chunk_id, e));
                        skipped += 1;
                        segments.push(None);
                    }
                },
            }

            pb.inc(1);
        }

        pb.finish_and_clear();

        let stream = assemble(segments)?;
        if stream.is_empty() {
            return Err(PipelineError::NoAudio);
        }

        log::info!("Encoding {:?} of audio", stream.duration());
        let bytes = self.encoder.encode(&stream)?;

        Ok(Audiobook {
            bytes,
            filename: filename.to_string(),
            duration: stream.duration(),
            chunks_total: total,
            chunks_skipped: skipped,
        })
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}
