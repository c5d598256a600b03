//! Google Translate text-to-speech provider
//!
//! Talks to the same public batchexecute RPC the Translate web page uses.
//! The endpoint only accepts short pieces of text, so a request is split into
//! pieces of at most [`MAX_REQUEST_CHARS`] characters and the returned MP3
//! frames are concatenated in order.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{REFERER, RETRY_AFTER};
use std::sync::OnceLock;

use crate::error::{Result, TtsError};
use crate::provider::{SpeechAudio, SpeechBackend, SpeechRequest};

/// RPC identifier of the speech endpoint
const RPC_ID: &str = "jQ1olc";

/// Largest piece of text the endpoint accepts in one call
pub const MAX_REQUEST_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Punctuation after which a piece of text may be cut
const BREAK_CHARS: &[char] = &['.', '?', '!', ',', ';', ':', '\u{2026}', '\u{2014}', '\n'];

static AUDIO_RE: OnceLock<Regex> = OnceLock::new();

fn audio_regex() -> &'static Regex {
    AUDIO_RE.get_or_init(|| {
        Regex::new(r#"jQ1olc","\[\\"(.*)\\"\]"#).expect("audio pattern is a valid regex")
    })
}

/// Provider for the Google Translate voice
pub struct GoogleTranslateProvider {
    client: Client,
}

impl GoogleTranslateProvider {
    /// Create a provider with its own HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TtsError::ApiError {
                message: format!("Failed to build HTTP client: {}", e),
                status_code: None,
            })?;
        Ok(Self { client })
    }

    /// Create a provider that reuses an existing client session
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn synthesize_piece(&self, url: &str, piece: &str, language: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(url)
            .header(REFERER, "http://translate.google.com/")
            .form(&[("f.req", package_rpc(piece, language))])
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(TtsError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string();
            return Err(TtsError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| TtsError::ApiError {
            message: format!("Failed to read response: {}", e),
            status_code: None,
        })?;

        parse_audio(&body)
    }
}

/// Endpoint for the regional voice
fn endpoint(tld: &str) -> String {
    format!("https://translate.google.{}/_/TranslateWebserverUi/data/batchexecute", tld)
}

/// Build the `f.req` form value for one piece of text.
fn package_rpc(text: &str, language: &str) -> String {
    let parameter = serde_json::json!([text, language, null, "null"]).to_string();
    serde_json::json!([[[RPC_ID, parameter, null, "generic"]]]).to_string()
}

/// Pull the base64 audio out of a batchexecute response body.
fn parse_audio(body: &str) -> Result<Vec<u8>> {
    let mut audio = Vec::new();

    for line in body.lines().filter(|l| l.contains(RPC_ID)) {
        if let Some(caps) = audio_regex().captures(line) {
            let decoded = STANDARD
                .decode(&caps[1])
                .map_err(|e| TtsError::InvalidResponse {
                    provider: "Google Translate".to_string(),
                    message: format!("audio is not valid base64: {}", e),
                })?;
            audio.extend(decoded);
        }
    }

    if audio.is_empty() {
        return Err(TtsError::InvalidResponse {
            provider: "Google Translate".to_string(),
            message: "no audio stream in response".to_string(),
        });
    }

    Ok(audio)
}

/// Split text into pieces the endpoint accepts.
///
/// Cuts after punctuation first, then on spaces for pieces that are still
/// too long, and finally at `max_chars` for unbroken runs. Adjacent short
/// pieces are merged back together while they fit.
pub fn split_for_requests(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();

    for sentence in split_after_punctuation(text) {
        if sentence.chars().count() <= max_chars {
            pieces.push(sentence);
        } else {
            pieces.extend(minimize(&sentence, max_chars));
        }
    }

    let mut merged: Vec<String> = Vec::new();
    for piece in pieces {
        if !piece.chars().any(char::is_alphanumeric) {
            // Punctuation on its own makes the endpoint return nothing; keep it
            // attached to the previous piece when there is room.
            if let Some(last) = merged.last_mut() {
                if last.chars().count() + piece.chars().count() < max_chars {
                    last.push_str(&piece);
                }
            }
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.chars().count() + 1 + piece.chars().count() <= max_chars => {
                last.push(' ');
                last.push_str(&piece);
            }
            _ => merged.push(piece),
        }
    }

    merged
}

fn split_after_punctuation(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if BREAK_CHARS.contains(&c) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// Cut an over-long piece on the last space that keeps it within bounds.
fn minimize(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest: Vec<char> = text.chars().collect();

    while rest.len() > max_chars {
        let cut = rest[..=max_chars]
            .iter()
            .rposition(|c| *c == ' ')
            .filter(|&idx| idx > 0)
            .unwrap_or(max_chars);
        let head: String = rest[..cut].iter().collect();
        pieces.push(head.trim().to_string());
        rest = rest[cut..].to_vec();
        while rest.first() == Some(&' ') {
            rest.remove(0);
        }
    }

    let tail: String = rest.into_iter().collect();
    if !tail.trim().is_empty() {
        pieces.push(tail.trim().to_string());
    }

    pieces
}

#[async_trait]
impl SpeechBackend for GoogleTranslateProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        let pieces = split_for_requests(&request.text, MAX_REQUEST_CHARS);
        if pieces.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let url = endpoint(request.accent.tld());
        let mut bytes = Vec::new();

        for (i, piece) in pieces.iter().enumerate() {
            log::debug!(
                "Google Translate request {}/{} ({} chars) to {}",
                i + 1,
                pieces.len(),
                piece.chars().count(),
                url
            );
            bytes.extend(self.synthesize_piece(&url, piece, &request.language).await?);
        }

        Ok(SpeechAudio { bytes })
    }

    fn name(&self) -> &'static str {
        "Google Translate"
    }
}
