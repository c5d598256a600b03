//! Audiobook assembly from per-chunk segments.

use super::{AudioError, AudioSegment};

/// Concatenate chunk segments, in order, into one stream.
///
/// Chunks whose synthesis failed are `None` and are left out entirely; no
/// silence is inserted in their place.
pub fn assemble<I>(segments: I) -> Result<AudioSegment, AudioError>
where
    I: IntoIterator<Item = Option<AudioSegment>>,
{
    let mut stream = AudioSegment::empty();
    for segment in segments.into_iter().flatten() {
        stream.append(&segment)?;
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tone;
    use std::time::Duration;

    fn segment(value: i16, len: usize) -> AudioSegment {
        AudioSegment::new(vec![value; len], 8_000, 1)
    }

    #[test]
    fn test_assembles_in_order() {
        let a = segment(1, 2);
        let b = segment(2, 3);
        let c = segment(3, 1);

        let stream = assemble([Some(a), Some(b), Some(c)]).unwrap();
        assert_eq!(stream.samples(), &[1, 1, 2, 2, 2, 3]);
    }

    #[test]
    fn test_skipped_segment_is_omitted() {
        let stream = assemble([Some(segment(1, 2)), None, Some(segment(3, 1))]).unwrap();
        assert_eq!(stream.samples(), &[1, 1, 3]);
    }

    #[test]
    fn test_duration_adds_up() {
        let second = || Some(tone(440.0, Duration::from_secs(1), 8_000));
        let stream = assemble([second(), None, second(), second()]).unwrap();
        assert_eq!(stream.duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_nothing_to_assemble() {
        let stream = assemble(Vec::<Option<AudioSegment>>::new()).unwrap();
        assert!(stream.is_empty());
        assert!(assemble([None, None]).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_formats() {
        let other = AudioSegment::new(vec![0; 4], 44_100, 2);
        assert!(assemble([Some(segment(1, 2)), Some(other)]).is_err());
    }
}
