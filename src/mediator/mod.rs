//! Request mediation: turns an [`ApiRequest`] into decoded upstream JSON.
//!
//! Two [`Mediator`] implementations exist, picked at startup:
//! [`ProxyMediator`] (one same-origin endpoint) and [`ChainMediator`]
//! (ordered public mediators with fallback). [`ApiClient`] sits in front
//! of either and adds caching and rate limiting.

pub mod chain;
pub mod client;
pub mod proxy;
pub mod request;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::ApiError;
use crate::config::Wrapping;
use crate::fetcher::Fetcher;

pub use chain::ChainMediator;
pub use client::ApiClient;
pub use proxy::ProxyMediator;
pub use request::{ApiRequest, CommunityPolicy, UpstreamRequest};

#[async_trait]
pub trait Mediator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn fetch_json(&self, request: &UpstreamRequest) -> Result<Value, ApiError>;
}

/// One GET through a mediator: timeout, status check, HTML rejection and
/// JSON decoding. Every failure is final for this attempt only.
pub(crate) async fn attempt(
    fetcher: &(dyn Fetcher + Send + Sync),
    url: &str,
    timeout: Duration,
    wrapping: Wrapping,
) -> Result<Value, ApiError> {
    let response = match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ApiError::Timeout {
                after_ms: timeout.as_millis() as u64,
            })
        }
    };

    if !response.is_success() {
        return Err(ApiError::UpstreamStatus(response.status));
    }
    if response.is_html() {
        return Err(ApiError::MediatorDecode("received an HTML page".into()));
    }

    let value = decode_body(&response.body)?;
    match wrapping {
        Wrapping::Direct => Ok(value),
        Wrapping::Envelope => unwrap_envelope(value),
    }
}

fn decode_body(body: &[u8]) -> Result<Value, ApiError> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim_start();
    if trimmed.starts_with('<') {
        return Err(ApiError::MediatorDecode("received an HTML page".into()));
    }
    serde_json::from_str(trimmed).map_err(|e| ApiError::MediatorDecode(e.to_string()))
}

/// `{"contents": ...}` where contents is either the JSON itself or a string
/// holding it.
fn unwrap_envelope(value: Value) -> Result<Value, ApiError> {
    let Value::Object(mut envelope) = value else {
        return Err(ApiError::MediatorDecode("envelope is not an object".into()));
    };
    match envelope.remove("contents") {
        Some(Value::String(inner)) => decode_body(inner.as_bytes()),
        Some(Value::Null) | None => Err(ApiError::MediatorDecode(
            "envelope has no contents".into(),
        )),
        Some(inner) => Ok(inner),
    }
}
