//! Local document files.

use super::{Document, SourceError};
use crate::text::DocumentKind;
use std::ffi::OsStr;
use std::path::Path;

/// Payload kind for a local file, from its extension (case-insensitive).
pub fn kind_for_path(path: &Path) -> Option<DocumentKind> {
    let ext = path.extension().and_then(OsStr::to_str)?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "txt" | "text" => Some(DocumentKind::PlainText),
        _ => None,
    }
}

/// Read a local PDF or text file.
pub fn read_file(path: &Path) -> Result<Document, SourceError> {
    let kind =
        kind_for_path(path).ok_or_else(|| SourceError::UnsupportedFileType(path.to_path_buf()))?;

    let payload = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Document {
        payload,
        kind,
        label: None,
        origin: path.display().to_string(),
    })
}

/// Suggested output name: the file's base name with the audio extension.
pub fn file_filename(path: &Path, extension: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "audiobook".to_string());
    format!("{}.{}", stem, extension)
}
