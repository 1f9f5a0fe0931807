use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::ApiError;
use crate::config::mediators::order_for_client;
use crate::config::MediatorDescriptor;
use crate::fetcher::Fetcher;
use crate::mediator::{attempt, Mediator, UpstreamRequest};

pub const MOBILE_EXHAUSTED_MESSAGE: &str =
    "Unable to load content on this mobile connection. Please try again, or switch to Wi-Fi or a desktop browser.";
pub const DESKTOP_EXHAUSTED_MESSAGE: &str =
    "Unable to reach the server through any available proxy. Please try again later.";

/// Ordered public mediators. Each is tried at most once per request, in
/// an order fixed at construction from the client's device class.
pub struct ChainMediator {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    mediators: Vec<MediatorDescriptor>,
    upstream_base: String,
    timeout: Duration,
    mobile: bool,
}

impl ChainMediator {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        mediators: &[MediatorDescriptor],
        upstream_base: &str,
        timeout: Duration,
        mobile: bool,
    ) -> Self {
        Self {
            fetcher,
            mediators: order_for_client(mediators, mobile),
            upstream_base: upstream_base.to_string(),
            timeout,
            mobile,
        }
    }

    pub fn mediators(&self) -> &[MediatorDescriptor] {
        &self.mediators
    }

    fn exhausted(&self, attempts: usize) -> ApiError {
        let message = if self.mobile {
            MOBILE_EXHAUSTED_MESSAGE
        } else {
            DESKTOP_EXHAUSTED_MESSAGE
        };
        ApiError::Exhausted {
            attempts,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Mediator for ChainMediator {
    fn name(&self) -> &str {
        "chain"
    }

    async fn fetch_json(&self, request: &UpstreamRequest) -> Result<Value, ApiError> {
        let upstream_url = request.url(&self.upstream_base);
        let mut attempts = 0;

        for mediator in &self.mediators {
            attempts += 1;
            let url = mediator.wrap_url(&upstream_url);
            match attempt(self.fetcher.as_ref(), &url, self.timeout, mediator.wrapping).await {
                Ok(value) => {
                    tracing::debug!(mediator = %mediator.name, attempts, "Mediator succeeded");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(
                        mediator = %mediator.name,
                        kind = ?e.kind(),
                        error = %e,
                        "Mediator attempt failed, trying next"
                    );
                }
            }
        }

        tracing::error!(upstream = %upstream_url, attempts, "All mediators failed");
        Err(self.exhausted(attempts))
    }
}
