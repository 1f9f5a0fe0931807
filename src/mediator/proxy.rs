use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::form_urlencoded;

use crate::app::ApiError;
use crate::config::Wrapping;
use crate::fetcher::Fetcher;
use crate::mediator::{attempt, Mediator, UpstreamRequest};

/// Same-origin proxy: `<endpoint>?path=<upstream path>&<upstream query>`.
/// One attempt per request.
pub struct ProxyMediator {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    endpoint: String,
    timeout: Duration,
}

impl ProxyMediator {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, endpoint: &str, timeout: Duration) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    pub fn proxy_url(&self, request: &UpstreamRequest) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("path", &request.path)
            .extend_pairs(request.query.iter())
            .finish();
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.endpoint, separator, query)
    }
}

#[async_trait]
impl Mediator for ProxyMediator {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn fetch_json(&self, request: &UpstreamRequest) -> Result<Value, ApiError> {
        let url = self.proxy_url(request);
        let result = attempt(self.fetcher.as_ref(), &url, self.timeout, Wrapping::Direct).await;
        if let Err(e) = &result {
            tracing::warn!(url = %url, error = %e, "Proxy request failed");
        }
        result
    }
}
