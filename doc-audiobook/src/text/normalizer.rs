//! Text normalization for narration.
//!
//! Extracted text is full of hard line wraps, blank-line paragraph breaks and
//! ASCII rules (`-----`, `=====`). The normalized form keeps each paragraph on
//! one line and separates paragraphs with [`PARAGRAPH_BREAK`].

use super::PARAGRAPH_BREAK;
use regex::Regex;
use std::sync::OnceLock;

/// Characters that are invisible to a reader but confuse TTS, and their replacements.
const INVISIBLE_CHARS: &[(char, &str)] = &[
    ('\u{00a0}', " "), // Non-breaking space
    ('\u{200b}', ""),  // Zero-width space
    ('\u{200c}', ""),  // Zero-width non-joiner
    ('\u{200d}', ""),  // Zero-width joiner
    ('\u{feff}', ""),  // BOM
];

static DECORATIVE_RE: OnceLock<Regex> = OnceLock::new();
static PARAGRAPH_RE: OnceLock<Regex> = OnceLock::new();

/// Runs of three or more separator characters.
fn decorative_regex() -> &'static Regex {
    DECORATIVE_RE.get_or_init(|| Regex::new(r"[-=_*]{3,}").expect("valid decorative pattern"))
}

/// A newline, optional whitespace, and at least one more newline.
fn paragraph_regex() -> &'static Regex {
    PARAGRAPH_RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"))
}

/// Normalize extracted text into narration text.
///
/// 1. Unify line endings and drop invisible/control characters
/// 2. Remove decorative runs of `-`, `=`, `_` or `*`
/// 3. Split paragraphs on blank lines
/// 4. Join wrapped lines inside each paragraph with single spaces
///
/// The result is idempotent: normalizing it again returns it unchanged.
pub fn normalize_text(text: &str) -> String {
    let text = strip_invisible(&text.replace("\r\n", "\n").replace('\r', "\n"));
    let text = decorative_regex().replace_all(&text, "");

    paragraph_regex()
        .split(&text)
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BREAK)
}

fn strip_invisible(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if let Some((_, replacement)) = INVISIBLE_CHARS.iter().find(|(ch, _)| *ch == c) {
            result.push_str(replacement);
        } else if !c.is_control() || c.is_whitespace() {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keeps_paragraph_boundaries() {
        let text = "Hello world.\n\nThis is a test.";
        assert_eq!(normalize_text(text), "Hello world.\n\nThis is a test.");
    }

    #[test]
    fn test_joins_wrapped_lines() {
        let text = "line one\nline two\n\n\n  \n  next para\nwraps here";
        assert_eq!(
            normalize_text(text),
            "line one line two\n\nnext para wraps here"
        );
    }

    #[test]
    fn test_removes_decorative_runs() {
        let text = "Intro\n-----\nBody ***** end == and --- more =_*=";
        assert_eq!(normalize_text(text), "Intro\n\nBody end == and more");
    }

    #[test]
    fn test_short_dashes_survive() {
        assert_eq!(normalize_text("well-known -- really"), "well-known -- really");
    }

    #[test]
    fn test_windows_line_endings() {
        let text = "First\r\nsecond\r\n\r\nThird";
        assert_eq!(normalize_text(text), "First second\n\nThird");
    }

    #[test]
    fn test_invisible_chars() {
        let text = "\u{feff}Hello\u{200b}World\u{00a0}again\x07";
        assert_eq!(normalize_text(text), "HelloWorld again");
    }

    #[test]
    fn test_form_feed_between_pages() {
        let text = "end of page.\x0cStart of next";
        assert_eq!(normalize_text(text), "end of page. Start of next");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\n \t\n"), "");
        assert_eq!(normalize_text("====\n****"), "");
    }

    #[test]
    fn test_no_newline_inside_paragraph() {
        let normalized = normalize_text("a\nb\n\nc\nd\n\n\n\ne");
        for paragraph in normalized.split(PARAGRAPH_BREAK) {
            assert!(!paragraph.contains('\n'));
            assert!(!paragraph.is_empty());
        }
        assert_eq!(normalized, "a b\n\nc d\n\ne");
    }

    proptest! {
        #[test]
        fn prop_idempotent_on_document_like_text(text in "[a-z .,=*_\\-\n\r\t]{0,300}") {
            let once = normalize_text(&text);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn prop_idempotent_on_any_text(text in "\\PC{0,200}") {
            let once = normalize_text(&text);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn prop_no_decorative_runs(text in "[a-z =*_\\-\n]{0,300}") {
            let normalized = normalize_text(&text);
            prop_assert!(!decorative_regex().is_match(&normalized));
        }
    }
}
