//! Holding a finished audiobook until it is delivered.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No audiobook is waiting to be delivered")]
    NothingPending,

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An encoded audiobook ready to be written out.
#[derive(Debug, Clone)]
pub struct Audiobook {
    pub bytes: Vec<u8>,
    /// Suggested file name, extension included
    pub filename: String,
    pub duration: Duration,
    pub chunks_total: usize,
    pub chunks_skipped: usize,
}

impl Audiobook {
    /// Size in megabytes, for reporting.
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }
}

/// Holds at most one generated audiobook; each one is handed out exactly once.
#[derive(Debug, Default)]
pub struct GenerationSession {
    pending: Option<Audiobook>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a freshly generated audiobook, replacing any undelivered one.
    pub fn store(&mut self, audiobook: Audiobook) {
        if let Some(old) = self.pending.replace(audiobook) {
            log::debug!("Discarding undelivered audiobook {}", old.filename);
        }
    }

    /// Take the pending audiobook, leaving the session empty.
    pub fn take(&mut self) -> Option<Audiobook> {
        self.pending.take()
    }

    /// Write the pending audiobook into `output_dir` and return its path.
    ///
    /// The audiobook stays pending until the file is written, so a failed
    /// write can be retried with another directory.
    pub fn deliver(&mut self, output_dir: &Path) -> Result<PathBuf, SessionError> {
        let audiobook = self.pending.as_ref().ok_or(SessionError::NothingPending)?;
        let path = output_dir.join(&audiobook.filename);

        std::fs::create_dir_all(output_dir).map_err(|source| SessionError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;
        std::fs::write(&path, &audiobook.bytes).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;

        log::info!("Wrote {} ({:.1} MB)", path.display(), audiobook.size_mb());
        self.pending = None;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn audiobook(name: &str) -> Audiobook {
        Audiobook {
            bytes: b"ID3audio".to_vec(),
            filename: name.to_string(),
            duration: Duration::from_secs(2),
            chunks_total: 2,
            chunks_skipped: 0,
        }
    }

    #[test]
    fn test_take_delivers_once() {
        let mut session = GenerationSession::new();
        assert!(session.take().is_none());

        session.store(audiobook("a.mp3"));
        assert_eq!(session.take().unwrap().filename, "a.mp3");
        assert!(session.take().is_none());
    }

    #[test]
    fn test_store_replaces_pending() {
        let mut session = GenerationSession::new();
        session.store(audiobook("old.mp3"));
        session.store(audiobook("new.mp3"));
        assert_eq!(session.take().unwrap().filename, "new.mp3");
        assert!(session.take().is_none());
    }

    #[test]
    fn test_deliver_writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("books");
        let mut session = GenerationSession::new();
        session.store(audiobook("letters.mp3"));

        let path = session.deliver(&out).unwrap();
        assert_eq!(path, out.join("letters.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3audio");

        let err = session.deliver(&out).unwrap_err();
        assert!(matches!(err, SessionError::NothingPending));
    }

    #[test]
    fn test_failed_write_keeps_audiobook() {
        let dir = TempDir::new().unwrap();
        let not_a_dir = dir.path().join("not_a_dir");
        std::fs::write(&not_a_dir, b"occupied").unwrap();

        let mut session = GenerationSession::new();
        session.store(audiobook("letters.mp3"));

        let err = session.deliver(&not_a_dir).unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));

        let path = session.deliver(dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3audio");
        assert!(session.take().is_none());
    }
}
