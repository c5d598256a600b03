//! Decoded PCM audio.

use super::AudioError;
use std::time::Duration;

/// Interleaved 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioSegment {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    /// Wrap interleaved samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// A stream with no samples and no format yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        (self.samples.len() / self.channels as usize) as u64
    }

    /// Playback length.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let rate = self.sample_rate as u64;
        let frames = self.frames();
        Duration::from_secs(frames / rate)
            + Duration::from_nanos((frames % rate) * 1_000_000_000 / rate)
    }

    /// Append another segment's samples to this one.
    ///
    /// An empty stream adopts the format of the first segment appended to it.
    pub fn append(&mut self, other: &AudioSegment) -> Result<(), AudioError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() && self.sample_rate == 0 {
            self.sample_rate = other.sample_rate;
            self.channels = other.channels;
        }
        if self.sample_rate != other.sample_rate || self.channels != other.channels {
            return Err(AudioError::FormatMismatch {
                expected_rate: self.sample_rate,
                expected_channels: self.channels,
                rate: other.sample_rate,
                channels: other.channels,
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn tone(freq: f32, duration: Duration, sample_rate: u32) -> AudioSegment {
    let frames = (duration.as_secs_f64() * sample_rate as f64).round() as usize;
    let samples = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((t * freq * std::f32::consts::TAU).sin() * 8000.0) as i16
        })
        .collect();
    AudioSegment::new(samples, sample_rate, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let segment = AudioSegment::new(vec![0; 48_000], 24_000, 1);
        assert_eq!(segment.duration(), Duration::from_secs(2));

        let stereo = AudioSegment::new(vec![0; 36_000], 24_000, 2);
        assert_eq!(stereo.duration(), Duration::from_millis(750));

        assert_eq!(AudioSegment::empty().duration(), Duration::ZERO);
    }

    #[test]
    fn test_append_adopts_format() {
        let mut stream = AudioSegment::empty();
        stream.append(&AudioSegment::new(vec![1, 2], 22_050, 1)).unwrap();
        stream.append(&AudioSegment::new(vec![3], 22_050, 1)).unwrap();
        assert_eq!(stream.samples(), &[1, 2, 3]);
        assert_eq!(stream.sample_rate(), 22_050);
        assert_eq!(stream.channels(), 1);
    }

    #[test]
    fn test_append_rejects_other_format() {
        let mut stream = AudioSegment::new(vec![1], 24_000, 1);
        let err = stream
            .append(&AudioSegment::new(vec![1, 1], 44_100, 2))
            .unwrap_err();
        assert!(matches!(err, AudioError::FormatMismatch { .. }));
        assert_eq!(stream.samples(), &[1]);
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut stream = AudioSegment::new(vec![5], 24_000, 1);
        stream.append(&AudioSegment::empty()).unwrap();
        assert_eq!(stream.samples(), &[5]);
    }

    #[test]
    fn test_tone_length() {
        let segment = tone(440.0, Duration::from_secs(1), 8_000);
        assert_eq!(segment.frames(), 8_000);
        assert_eq!(segment.duration(), Duration::from_secs(1));
    }
}
