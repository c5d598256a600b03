//! Final encoding of the assembled audio stream.

use super::{AudioError, AudioSegment};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tempfile::TempDir;

/// Bitrate of the MP3 output; speech does not need more.
const MP3_BITRATE: &str = "64k";

/// Encodes a PCM stream into an output container, in memory.
pub trait AudioEncoder: Send + Sync {
    fn encode(&self, audio: &AudioSegment) -> Result<Vec<u8>, AudioError>;

    /// File extension of the produced container.
    fn extension(&self) -> &'static str;
}

/// Output container of the audiobook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp3,
    Wav,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            other => Err(format!("Unknown output format: {} (expected mp3 or wav)", other)),
        }
    }
}

/// Create the encoder for an output format.
pub fn create_encoder(format: OutputFormat, ffmpeg: Option<&Path>) -> Box<dyn AudioEncoder> {
    match format {
        OutputFormat::Mp3 => Box::new(Mp3Encoder::new(ffmpeg.map(Path::to_path_buf))),
        OutputFormat::Wav => Box::new(WavEncoder),
    }
}

/// MP3 encoder that shells out to FFmpeg.
pub struct Mp3Encoder {
    ffmpeg: PathBuf,
}

impl Mp3Encoder {
    /// Use the given FFmpeg binary, or `ffmpeg` from PATH.
    pub fn new(ffmpeg: Option<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.unwrap_or_else(|| PathBuf::from("ffmpeg")),
        }
    }

    fn ffmpeg_command(&self) -> Command {
        Command::new(&self.ffmpeg)
    }

    /// Check if FFmpeg can be run.
    pub fn is_available(&self) -> bool {
        self.ffmpeg_command()
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl AudioEncoder for Mp3Encoder {
    fn encode(&self, audio: &AudioSegment) -> Result<Vec<u8>, AudioError> {
        if audio.is_empty() {
            return Err(AudioError::Encode("no audio to encode".to_string()));
        }

        let temp_dir = TempDir::new()?;
        let pcm_path = temp_dir.path().join("audiobook.pcm");
        let mp3_path = temp_dir.path().join("audiobook.mp3");

        let pcm: Vec<u8> = audio
            .samples()
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        std::fs::write(&pcm_path, pcm)?;

        let output = self
            .ffmpeg_command()
            .args(["-y", "-f", "s16le", "-ar"])
            .arg(audio.sample_rate().to_string())
            .arg("-ac")
            .arg(audio.channels().to_string())
            .arg("-i")
            .arg(&pcm_path)
            .args(["-c:a", "libmp3lame", "-b:a", MP3_BITRATE])
            .arg(&mp3_path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AudioError::FfmpegMissing(self.ffmpeg.clone())
                } else {
                    AudioError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::Encode(format!("ffmpeg failed: {}", stderr.trim())));
        }

        Ok(std::fs::read(&mp3_path)?)
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }
}

/// 16-bit WAV encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder;

impl AudioEncoder for WavEncoder {
    fn encode(&self, audio: &AudioSegment) -> Result<Vec<u8>, AudioError> {
        if audio.is_empty() {
            return Err(AudioError::Encode("no audio to encode".to_string()));
        }

        let spec = hound::WavSpec {
            channels: audio.channels(),
            sample_rate: audio.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
            for sample in audio.samples() {
                writer
                    .write_sample(*sample)
                    .map_err(|e| AudioError::Encode(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}
