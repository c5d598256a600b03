//! Plain-text extraction from PDF, text and HTML payloads.

use html2text::render::text_renderer::TrivialDecorator;
use std::panic::{self, UnwindSafe};
use thiserror::Error;

/// Render width for HTML; wide enough that html2text never wraps prose.
const HTML_RENDER_WIDTH: usize = 10_000;

/// Kind of payload a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Html,
}

impl DocumentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::PlainText => "text",
            Self::Html => "HTML",
        }
    }
}

/// Text extraction errors.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error reading PDF file: {0}")]
    Pdf(String),

    #[error("Error reading text file: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Error parsing HTML: {0}")]
    Html(String),
}

/// Extract plain text from a payload of the given kind.
pub fn extract_text(payload: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::Pdf => guarded(|| pdf_extract::extract_text_from_mem(payload))
            .map_err(ExtractionError::Pdf)?
            .map_err(|e| ExtractionError::Pdf(e.to_string())),
        DocumentKind::PlainText => Ok(String::from_utf8(payload.to_vec())?),
        DocumentKind::Html => guarded(|| html_to_text(payload)).map_err(ExtractionError::Html),
    }
}

/// Extract text, reporting failures as warnings and returning an empty string.
///
/// A single bad document must not sink a multi-document run.
pub fn extract_or_warn(payload: &[u8], kind: DocumentKind, source: &str) -> String {
    match extract_text(payload, kind) {
        Ok(text) => {
            log::debug!(
                "Extracted {} characters of {} from {}",
                text.chars().count(),
                kind.name(),
                source
            );
            text
        }
        Err(e) => {
            log::warn!("{} ({})", e, source);
            String::new()
        }
    }
}

/// Run a parser that may panic on malformed input.
fn guarded<T>(f: impl FnOnce() -> T + UnwindSafe) -> Result<T, String> {
    panic::catch_unwind(f).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "parser panicked".to_string())
    })
}

/// Convert HTML to text lines.
///
/// Script and style content is dropped by html2text. Each rendered line is
/// trimmed; the blank line html2text puts between block elements is kept
/// (once) so paragraphs survive normalization.
fn html_to_text(html: &[u8]) -> String {
    let rendered =
        html2text::from_read_with_decorator(html, HTML_RENDER_WIDTH, TrivialDecorator::new());

    let mut result = String::new();
    let mut pending_break = false;

    for line in rendered.lines().map(str::trim) {
        if line.is_empty() {
            pending_break = !result.is_empty();
            continue;
        }
        if !result.is_empty() {
            result.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        result.push_str(line);
        pending_break = false;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let text = extract_text("Hello wörld\n".as_bytes(), DocumentKind::PlainText).unwrap();
        assert_eq!(text, "Hello wörld\n");
    }

    #[test]
    fn test_plain_text_invalid_utf8() {
        let err = extract_text(&[0x66, 0x6f, 0xff, 0xfe], DocumentKind::PlainText).unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }

    #[test]
    fn test_malformed_pdf_is_an_error() {
        let err = extract_text(b"definitely not a pdf", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn test_extract_or_warn_returns_empty_on_failure() {
        assert_eq!(
            extract_or_warn(b"%PDF-garbage", DocumentKind::Pdf, "broken.pdf"),
            ""
        );
        assert_eq!(
            extract_or_warn(&[0xff], DocumentKind::PlainText, "bad.txt"),
            ""
        );
    }

    #[test]
    fn test_html_strips_markup_and_scripts() {
        let html = br#"<html><head><title>T</title><style>p { color: red; }</style>
            <script>var x = "hidden";</script></head>
            <body><h1>  Letter  </h1><p>First <b>bold</b> paragraph.</p>
            <p>Second paragraph with a <a href="/x">link</a>.</p></body></html>"#;
        let text = extract_text(html, DocumentKind::Html).unwrap();

        assert!(!text.contains('<'));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
        assert!(!text.contains("[1]"));
        assert!(text.contains("Letter"));
        assert!(text.contains("First bold paragraph."));
        assert!(text.contains("Second paragraph with a link."));
        for line in text.lines() {
            assert_eq!(line, line.trim());
        }
    }

    #[test]
    fn test_html_blocks_become_paragraphs() {
        let html = b"<p>One</p><p>Two</p>";
        let text = extract_text(html, DocumentKind::Html).unwrap();
        assert_eq!(text, "One\n\nTwo");
    }

    #[test]
    fn test_guarded_catches_panics() {
        let result: Result<(), String> = guarded(|| panic!("bad input"));
        assert_eq!(result.unwrap_err(), "bad input");
    }
}
