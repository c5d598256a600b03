//! Berkshire Hathaway shareholder letters, scraped from the public index page.

use super::fetch::Fetcher;
use super::{Document, SourceError};
use crate::text::DocumentKind;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

/// Index page listing one link per letter year.
pub const LETTERS_INDEX_URL: &str = "https://www.berkshirehathaway.com/letters/letters.html";

/// First year with a letter on the index page.
pub const FIRST_LETTER_YEAR: u16 = 1977;

/// Most recent year offered.
pub const LAST_LETTER_YEAR: u16 = 2024;

static ANCHOR_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn anchor_regex() -> &'static Regex {
    ANCHOR_RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))[^>]*>(.*?)</a\s*>"#,
        )
        .expect("valid anchor pattern")
    })
}

fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

/// Header paragraph announcing a letter.
pub fn section_header(year: &str) -> String {
    format!("Berkshire Hathaway Shareholder Letter: {}.", year)
}

/// Suggested output name for a year range.
pub fn letters_filename(start: u16, end: u16, extension: &str) -> String {
    format!("Berkshire_Hathaway_Letters_{}-{}.{}", start, end, extension)
}

/// Find the first link labelled with each year of `start..=end`.
///
/// Returns `(year, absolute_url)` in ascending year order. Years without a
/// link are left out.
pub fn find_letter_links(
    index_html: &str,
    index_url: &Url,
    start: u16,
    end: u16,
) -> Vec<(u16, String)> {
    let anchors: Vec<(String, String)> = anchor_regex()
        .captures_iter(index_html)
        .map(|caps| {
            // href is double-quoted, single-quoted or bare
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            let label = tag_regex().replace_all(&caps[4], "");
            (label.trim().to_string(), href.trim().to_string())
        })
        .collect();

    let mut links = Vec::new();
    for year in start..=end {
        let wanted = year.to_string();
        let Some((_, href)) = anchors.iter().find(|(label, _)| *label == wanted) else {
            log::debug!("No letter link for {}", year);
            continue;
        };
        match index_url.join(href) {
            Ok(url) => links.push((year, url.to_string())),
            Err(e) => log::warn!("Skipping letter {}: bad link {:?} ({})", year, href, e),
        }
    }

    links
}

/// Fetch every available letter in `start..=end`.
///
/// Fails with [`SourceError::NoLettersFound`] before fetching any letter body
/// if no year in the range has a link.
pub async fn collect_letters(
    fetcher: &dyn Fetcher,
    index_url: &str,
    start: u16,
    end: u16,
) -> Result<Vec<Document>, SourceError> {
    if start > end {
        return Err(SourceError::InvalidYearRange { start, end });
    }

    let base = Url::parse(index_url).map_err(|e| SourceError::InvalidUrl {
        url: index_url.to_string(),
        message: e.to_string(),
    })?;

    let index = fetcher.fetch(index_url).await?;
    let html = String::from_utf8_lossy(&index.bytes);
    let links = find_letter_links(&html, &base, start, end);

    if links.is_empty() {
        return Err(SourceError::NoLettersFound { start, end });
    }

    log::info!("Found {} letters to process", links.len());

    let mut documents = Vec::with_capacity(links.len());
    for (i, (year, url)) in links.iter().enumerate() {
        let page = fetcher.fetch(url).await?;
        let kind = if url.to_lowercase().ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Html
        };
        log::info!("Fetched letter for {} ({}/{})", year, i + 1, links.len());
        documents.push(Document {
            payload: page.bytes,
            kind,
            label: Some(year.to_string()),
            origin: page.url,
        });
    }

    Ok(documents)
}
