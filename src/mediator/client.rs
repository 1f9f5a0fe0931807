use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::{json, Value};

use crate::app::ApiError;
use crate::cache::TtlCache;
use crate::config::ApiConfig;
use crate::domain::{Sort, TimeWindow};
use crate::fetcher::RateLimiter;
use crate::mediator::{ApiRequest, CommunityPolicy, Mediator};

type Payload = Arc<Value>;
type InFlight = Shared<BoxFuture<'static, Result<Payload, ApiError>>>;

/// Page sizes sent with each request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub listing: u32,
    pub comments: u32,
    pub comment_depth: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            listing: 50,
            comments: 500,
            comment_depth: 10,
        }
    }
}

/// Cache → rate limit → mediator, for every read.
///
/// Cache hits return before admission. Concurrent misses for the same URL
/// share one upstream fetch.
pub struct ApiClient {
    mediator: Arc<dyn Mediator>,
    cache: Arc<TtlCache<Payload>>,
    limiter: Arc<RateLimiter>,
    policy: CommunityPolicy,
    upstream_base: String,
    limits: RequestLimits,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl ApiClient {
    pub fn new(
        mediator: Arc<dyn Mediator>,
        cache: Arc<TtlCache<Payload>>,
        limiter: Arc<RateLimiter>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            mediator,
            cache,
            limiter,
            policy: CommunityPolicy::from_config(config),
            upstream_base: config.upstream_base.clone(),
            limits: RequestLimits {
                listing: config.listing_limit,
                comments: config.comment_limit,
                comment_depth: config.comment_depth,
            },
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<TtlCache<Payload>> {
        &self.cache
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn policy(&self) -> &CommunityPolicy {
        &self.policy
    }

    /// Upstream URL a request resolves to; this is its cache key.
    pub fn cache_key(&self, request: &ApiRequest) -> String {
        request.resolve(&self.policy).url(&self.upstream_base)
    }

    pub async fn fetch(&self, request: &ApiRequest) -> Result<Payload, ApiError> {
        if request.is_empty_search() {
            tracing::debug!("Empty search query, skipping network");
            return Ok(Arc::new(empty_listing()));
        }

        let upstream = request.resolve(&self.policy);
        let key = upstream.url(&self.upstream_base);

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(url = %key, "Cache hit");
            return Ok(hit);
        }

        let shared = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(existing) = in_flight.get(&key) {
                tracing::debug!(url = %key, "Joining in-flight request");
                existing.clone()
            } else {
                let mediator = self.mediator.clone();
                let cache = self.cache.clone();
                let limiter = self.limiter.clone();
                let key_for_task = key.clone();
                let fut = async move {
                    tracing::debug!(url = %key_for_task, "Cache miss");
                    limiter.admit().await;
                    let value = Arc::new(mediator.fetch_json(&upstream).await?);
                    cache.insert(key_for_task.clone(), value.clone());
                    tracing::info!(url = %key_for_task, mediator = mediator.name(), "Fetched");
                    Ok(value)
                }
                .boxed()
                .shared();
                in_flight.insert(key.clone(), fut.clone());
                fut
            }
        };

        let result = shared.clone().await;
        self.release_in_flight(&key, &shared);
        result
    }

    /// Drop the in-flight entry for `key` if it is still `finished`. A newer
    /// fetch started under the same key after this one settled is kept.
    fn release_in_flight(&self, key: &str, finished: &InFlight) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if in_flight.get(key).is_some_and(|current| current.ptr_eq(finished)) {
            in_flight.remove(key);
        }
    }

    pub fn listing_request(&self, community: &str, sort: Sort, time_window: TimeWindow) -> ApiRequest {
        ApiRequest::Listing {
            community: community.to_string(),
            sort,
            time_window,
            limit: self.limits.listing,
        }
    }

    pub fn info_request(&self, id: &str) -> ApiRequest {
        ApiRequest::Info { id: id.to_string() }
    }

    pub fn comments_request(&self, community: &str, id: &str) -> ApiRequest {
        ApiRequest::Comments {
            community: community.to_string(),
            id: id.to_string(),
            limit: self.limits.comments,
            depth: self.limits.comment_depth,
        }
    }

    pub fn search_request(&self, community: &str, query: &str) -> ApiRequest {
        ApiRequest::Search {
            community: community.to_string(),
            query: query.to_string(),
            limit: self.limits.listing,
        }
    }
}

fn empty_listing() -> Value {
    json!({ "kind": "Listing", "data": { "children": [] } })
}
