//! HTTP page fetching.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Browser-like identification; some sites refuse unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/120.0.0.0 Safari/537.36";

/// Fetch errors. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch {url}: {message}")]
    Request { url: String, message: String },

    #[error("HTTP error: {status} for {url}")]
    Status { status: u16, url: String },
}

/// A fetched resource.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL, after redirects
    pub url: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Retrieves documents over the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetcher backed by one reused reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_lowercase);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .to_vec();

        Ok(FetchedPage {
            url: final_url,
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! In-memory fetcher for tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct StubFetcher {
        pages: HashMap<String, (Vec<u8>, Option<String>)>,
        fetched: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn with_page(mut self, url: &str, body: &[u8], content_type: Option<&str>) -> Self {
            self.pages
                .insert(url.to_string(), (body.to_vec(), content_type.map(str::to_string)));
            self
        }

        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some((bytes, content_type)) => Ok(FetchedPage {
                    url: url.to_string(),
                    bytes: bytes.clone(),
                    content_type: content_type.clone(),
                }),
                None => Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }
}
