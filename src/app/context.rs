use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::app::error::Result;
use crate::cache::{spawn_sweeper, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, MediatorMode};
use crate::coordinator::Coordinator;
use crate::domain::Selection;
use crate::fetcher::{Fetcher, HttpFetcher, RateLimiter};
use crate::mediator::{ApiClient, ChainMediator, Mediator, ProxyMediator};
use crate::store::Store;

/// Wires the cache, limiter, mediator, store and coordinators together.
///
/// Must be built inside a tokio runtime; the cache sweeper is spawned on
/// construction and aborted on drop.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<Store>,
    pub client: Arc<ApiClient>,
    pub coordinator: Coordinator,
    sweeper: JoinHandle<()>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.api.user_agent)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self::with_parts(config, fetcher, clock))
    }

    /// Build around an injected fetcher and clock.
    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let api = &config.api;
        let mediator: Arc<dyn Mediator> = match api.mediator_mode {
            MediatorMode::Proxy => Arc::new(ProxyMediator::new(
                fetcher,
                &api.proxy_endpoint,
                api.request_timeout(),
            )),
            MediatorMode::Chain => Arc::new(ChainMediator::new(
                fetcher,
                &api.mediators,
                &api.upstream_base,
                api.request_timeout(),
                config.client.mobile,
            )),
        };
        tracing::debug!(mediator = mediator.name(), mobile = config.client.mobile, "Mediator selected");

        let cache: Arc<TtlCache<Arc<Value>>> =
            Arc::new(TtlCache::with_ttl(clock.clone(), api.cache_ttl()));
        let sweeper = spawn_sweeper(cache.clone(), api.cache_sweep());
        let limiter = Arc::new(RateLimiter::with_limits(
            clock,
            api.rate_limit_n,
            api.rate_limit_window(),
        ));

        let client = Arc::new(ApiClient::new(mediator, cache, limiter, api));
        let store = Arc::new(Store::new(Selection::new(api.default_community.clone())));
        let coordinator = Coordinator::new(client.clone(), store.clone());

        Self {
            config,
            store,
            client,
            coordinator,
            sweeper,
        }
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{as_clock, listing_envelope, manual_clock, raw_post, ScriptedFetcher, Step};

    #[tokio::test]
    async fn test_proxy_mode_routes_through_endpoint() {
        let fetcher = Arc::new(ScriptedFetcher::default().route(
            "hot.json",
            Step::value(&listing_envelope(vec![raw_post("a1", 1, 0)])),
        ));
        let ctx = AppContext::with_parts(Config::default(), fetcher.clone(), as_clock(&manual_clock()));

        let selection = ctx.store.state().selection.clone();
        ctx.coordinator.load_listing(&selection).await.unwrap();

        assert!(fetcher.requested()[0].starts_with("http://localhost:3000/api/reddit?path="));
        assert_eq!(ctx.store.state().listing.len(), 1);
        assert_eq!(ctx.client.cache().size(), 1);
    }

    #[tokio::test]
    async fn test_chain_mode_uses_mediators() {
        let mut config = Config::default();
        config.api.mediator_mode = MediatorMode::Chain;
        let fetcher = Arc::new(ScriptedFetcher::default().route(
            "hot.json",
            Step::value(&listing_envelope(vec![])),
        ));
        let ctx = AppContext::with_parts(config, fetcher.clone(), as_clock(&manual_clock()));

        let selection = ctx.store.state().selection.clone();
        ctx.coordinator.load_listing(&selection).await.unwrap();

        assert!(fetcher.requested()[0].starts_with("https://corsproxy.io/"));
    }

    #[tokio::test]
    async fn test_starts_on_default_community() {
        let ctx = AppContext::with_parts(
            Config::default(),
            Arc::new(ScriptedFetcher::default()),
            as_clock(&manual_clock()),
        );
        assert_eq!(ctx.store.state().selection.community, "LiverpoolFC");
    }
}
