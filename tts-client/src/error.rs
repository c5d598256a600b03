use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TtsError {
    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("Nothing to synthesize: text is empty")]
    EmptyText,

    #[error("Unknown accent: {0}")]
    UnknownAccent(String),
}

impl TtsError {
    /// Whether the caller should back off and try the same request again.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
