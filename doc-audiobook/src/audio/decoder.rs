//! MP3 decoding of backend responses.

use super::{AudioError, AudioSegment};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Turns encoded audio returned by a speech backend into PCM.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSegment, AudioError>;
}

/// MP3 decoder built on symphonia.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp3Decoder;

impl AudioDecoder for Mp3Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSegment, AudioError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::Decode("no supported audio track".to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Decode(format!("unsupported codec: {}", e)))?;

        let mut samples: Vec<i16> = Vec::new();
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(AudioError::Decode(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u16;
                    let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                }
                // A corrupt frame is skipped, the rest of the stream is still usable.
                Err(SymphoniaError::DecodeError(e)) => {
                    log::debug!("Skipping undecodable MP3 frame: {}", e);
                }
                Err(e) => return Err(AudioError::Decode(e.to_string())),
            }
        }

        if samples.is_empty() {
            return Err(AudioError::Decode("no audio frames in stream".to_string()));
        }

        Ok(AudioSegment::new(samples, sample_rate, channels))
    }
}

/// Decoder for tests: every response byte becomes one 8 kHz mono sample.
#[cfg(test)]
pub(crate) struct BytesDecoder;

#[cfg(test)]
impl AudioDecoder for BytesDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSegment, AudioError> {
        if bytes.is_empty() {
            return Err(AudioError::Decode("no audio".to_string()));
        }
        Ok(AudioSegment::new(
            bytes.iter().map(|b| *b as i16).collect(),
            8_000,
            1,
        ))
    }
}
