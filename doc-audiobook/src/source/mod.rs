//! Document sources: shareholder letters, local files, and URLs.

pub mod fetch;
pub mod letters;
mod upload;
mod web;

pub use fetch::{DEFAULT_USER_AGENT, FetchError, Fetcher, HttpFetcher};
pub use letters::{FIRST_LETTER_YEAR, LAST_LETTER_YEAR, LETTERS_INDEX_URL, collect_letters};
pub use upload::read_file;
pub use web::fetch_url;

use crate::text::{DocumentKind, PARAGRAPH_BREAK, extract_or_warn, normalize_text};
use std::path::PathBuf;
use thiserror::Error;

/// Source errors. Every one of these aborts the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Could not find any letters between {start} and {end}")]
    NoLettersFound { start: u16, end: u16 },

    #[error("Start year {start} is after end year {end}")]
    InvalidYearRange { start: u16, end: u16 },

    #[error("Invalid URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Unsupported file type: {}. Use a PDF or text file", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A raw document awaiting extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub payload: Vec<u8>,
    pub kind: DocumentKind,
    /// Section label, e.g. a letter year
    pub label: Option<String>,
    /// Where the payload came from, for log messages
    pub origin: String,
}

/// What to narrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRequest {
    Letters { start: u16, end: u16 },
    File { path: PathBuf },
    Url { url: String },
}

impl SourceRequest {
    /// Suggested output filename for this source.
    pub fn suggested_filename(&self, extension: &str) -> String {
        match self {
            SourceRequest::Letters { start, end } => {
                letters::letters_filename(*start, *end, extension)
            }
            SourceRequest::File { path } => upload::file_filename(path, extension),
            SourceRequest::Url { .. } => format!("{}.{}", web::URL_FILENAME_STEM, extension),
        }
    }

    /// Header paragraph for a labelled document from this source.
    fn section_header(&self, label: &str) -> String {
        match self {
            SourceRequest::Letters { .. } => letters::section_header(label),
            _ => format!("{}.", label),
        }
    }
}

/// Gathers documents for a request and turns them into narration text.
pub struct SourceCollector<'a> {
    fetcher: &'a dyn Fetcher,
    index_url: String,
}

impl<'a> SourceCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self {
            fetcher,
            index_url: LETTERS_INDEX_URL.to_string(),
        }
    }

    /// Use a different letters index page.
    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    /// Fetch or read every document for the request, in narration order.
    pub async fn collect(&self, request: &SourceRequest) -> Result<Vec<Document>, SourceError> {
        match request {
            SourceRequest::Letters { start, end } => {
                collect_letters(self.fetcher, &self.index_url, *start, *end).await
            }
            SourceRequest::File { path } => Ok(vec![read_file(path)?]),
            SourceRequest::Url { url } => Ok(vec![fetch_url(self.fetcher, url).await?]),
        }
    }

    /// Collect the request's documents and return their combined narration text.
    pub async fn collect_text(&self, request: &SourceRequest) -> Result<String, SourceError> {
        let documents = self.collect(request).await?;
        Ok(collect_text(&documents, |label| request.section_header(label)))
    }
}

/// Extract and normalize each document, joining them with paragraph breaks.
///
/// Labelled documents are introduced by a header paragraph. Documents whose
/// extraction fails contribute nothing beyond their header.
pub fn collect_text<F>(documents: &[Document], header: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut parts = Vec::new();

    for document in documents {
        if let Some(label) = &document.label {
            parts.push(header(label));
        }
        let raw = extract_or_warn(&document.payload, document.kind, &document.origin);
        let text = normalize_text(&raw);
        if !text.is_empty() {
            parts.push(text);
        }
    }

    parts.join(PARAGRAPH_BREAK)
}
