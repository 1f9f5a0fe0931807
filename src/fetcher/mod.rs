pub mod http_fetcher;
pub mod rate_limit;

use async_trait::async_trait;

use crate::app::ApiError;

pub use http_fetcher::HttpFetcher;
pub use rate_limit::RateLimiter;

/// Raw response from a single GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// Issues one GET. Non-2xx statuses are returned, not raised; only
/// transport failures are errors.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ApiError>;
}
