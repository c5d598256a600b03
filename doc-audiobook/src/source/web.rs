//! Arbitrary web pages and PDF links.

use super::fetch::Fetcher;
use super::{Document, SourceError};
use crate::text::DocumentKind;

/// Output name for URL input.
pub const URL_FILENAME_STEM: &str = "audiobook_from_url";

/// Payload kind from the response's content type, falling back to the URL.
pub fn kind_for_response(url: &str, content_type: Option<&str>) -> DocumentKind {
    let is_pdf_type = content_type
        .map(|ct| ct.to_lowercase().contains("application/pdf"))
        .unwrap_or(false);

    if is_pdf_type || url.to_lowercase().ends_with(".pdf") {
        DocumentKind::Pdf
    } else {
        DocumentKind::Html
    }
}

/// Fetch one document from a URL.
pub async fn fetch_url(fetcher: &dyn Fetcher, url: &str) -> Result<Document, SourceError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(SourceError::InvalidUrl {
            url: String::new(),
            message: "Please enter a URL".to_string(),
        });
    }

    let page = fetcher.fetch(url).await?;
    let kind = kind_for_response(url, page.content_type.as_deref());

    Ok(Document {
        payload: page.bytes,
        kind,
        label: None,
        origin: page.url,
    })
}
