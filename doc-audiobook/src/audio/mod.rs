//! Audio decoding, assembly and encoding.

pub mod assembler;
pub mod decoder;
pub mod encoder;
mod segment;

pub use assembler::assemble;
pub use decoder::{AudioDecoder, Mp3Decoder};

#[cfg(test)]
pub(crate) use decoder::BytesDecoder;
pub use encoder::{AudioEncoder, Mp3Encoder, OutputFormat, create_encoder};
pub use segment::AudioSegment;

#[cfg(test)]
pub(crate) use segment::tone;

use std::path::PathBuf;
use thiserror::Error;

/// Audio errors.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error(
        "Cannot append {rate} Hz/{channels} ch audio to a {expected_rate} Hz/{expected_channels} ch stream"
    )]
    FormatMismatch {
        expected_rate: u32,
        expected_channels: u16,
        rate: u32,
        channels: u16,
    },

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Failed to encode audio: {0}")]
    Encode(String),

    #[error("FFmpeg not found at {0}. Install FFmpeg or use --format wav")]
    FfmpegMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
