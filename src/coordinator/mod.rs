//! User intents as async coordinators.
//!
//! Each coordinator emits a fixed sequence of [`Event`]s: a request event,
//! then exactly one success or failure event. Responses for a selection the
//! user has already left are dropped by the store.

use std::sync::Arc;

use crate::app::ApiError;
use crate::domain::{Post, RequestKey, Selection, Sort, TimeWindow};
use crate::mediator::ApiClient;
use crate::normalizer::Normalizer;
use crate::store::{Event, Store};

pub struct Coordinator {
    client: Arc<ApiClient>,
    store: Arc<Store>,
    normalizer: Normalizer,
}

impl Coordinator {
    pub fn new(client: Arc<ApiClient>, store: Arc<Store>) -> Self {
        Self {
            client,
            store,
            normalizer: Normalizer::new(),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Fetch the listing for `selection`. A viral sort only reorders.
    pub async fn load_listing(&self, selection: &Selection) -> Result<(), ApiError> {
        if selection.sort.is_client_side() {
            self.reorder_viral();
            return Ok(());
        }

        let mut selection = selection.clone();
        selection.search_term.clear();
        let key = selection.request_key();
        self.store.dispatch(Event::ListingRequest(key.clone()));

        let request = self.client.listing_request(
            &selection.community,
            selection.sort,
            selection.time_window,
        );
        let result = self
            .client
            .fetch(&request)
            .await
            .and_then(|payload| self.normalizer.normalize_listing(&payload));

        self.finish_listing(key, result)
    }

    /// Search within `community`. A blank query clears the search and
    /// yields an empty listing without touching the network.
    pub async fn search_listing(&self, query: &str, community: &str) -> Result<(), ApiError> {
        let term = query.trim().to_string();

        let mut selection = self.store.state().selection.clone();
        selection.community = community.to_string();
        selection.search_term = term.clone();
        if selection.sort.is_client_side() {
            selection.sort = Sort::Hot;
        }
        let key = selection.request_key();

        self.store.dispatch(Event::SearchRequest(key.clone()));
        self.store.dispatch(Event::SetSearchTerm(term.clone()));

        if term.is_empty() {
            self.store.dispatch(Event::ListingSuccess {
                key,
                posts: Vec::new(),
            });
            return Ok(());
        }

        let request = self.client.search_request(community, &term);
        let result = self
            .client
            .fetch(&request)
            .await
            .and_then(|payload| self.normalizer.normalize_listing(&payload));

        self.finish_listing(key, result)
    }

    pub async fn load_item_details(&self, id: &str) -> Result<(), ApiError> {
        let id = bare_post_id(id);
        self.store.dispatch(Event::ItemRequest { id: id.clone() });

        let request = self.client.info_request(&id);
        let result = self
            .client
            .fetch(&request)
            .await
            .and_then(|payload| self.normalizer.normalize_info(&payload));

        match result {
            Ok(mut post) => {
                // The lookup is keyed by the requested id
                post.id = id;
                if !self.store.dispatch(Event::ItemSuccess(post)) {
                    tracing::debug!("Item details superseded");
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id = %id, kind = ?e.kind(), error = %e, "Item details failed");
                self.store.dispatch(Event::ItemFailure {
                    id,
                    message: e.user_message(),
                    kind: Some(e.kind()),
                });
                Err(e)
            }
        }
    }

    pub async fn load_comments(&self, item_id: &str, community: &str) -> Result<(), ApiError> {
        let item_id = bare_post_id(item_id);
        self.store.dispatch(Event::CommentsRequest {
            item_id: item_id.clone(),
        });

        let request = self.client.comments_request(community, &item_id);
        let result = self
            .client
            .fetch(&request)
            .await
            .and_then(|payload| self.normalizer.normalize_comments(&payload));

        match result {
            Ok(comments) => {
                tracing::debug!(item_id = %item_id, roots = comments.len(), "Comments loaded");
                if !self.store.dispatch(Event::CommentsSuccess { item_id, comments }) {
                    tracing::debug!("Comments superseded");
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(item_id = %item_id, kind = ?e.kind(), error = %e, "Comments failed");
                self.store.dispatch(Event::CommentsFailure {
                    item_id,
                    message: e.user_message(),
                    kind: Some(e.kind()),
                });
                Err(e)
            }
        }
    }

    /// Client-side reorder; no I/O.
    pub fn reorder_viral(&self) {
        self.store.dispatch(Event::SortByViral);
    }

    /// Switch community and fetch its listing. Under viral sort the hot
    /// listing is fetched and then reordered.
    pub async fn change_community(&self, community: &str) -> Result<(), ApiError> {
        self.store.dispatch(Event::SetCommunity(community.to_string()));
        let selection = self.store.state().selection.clone();
        if !selection.sort.is_client_side() {
            return self.load_listing(&selection).await;
        }

        let result = self.load_listing(&selection.with_sort(Sort::Hot)).await;
        self.reorder_viral();
        result
    }

    pub async fn change_sort(&self, sort: Sort) -> Result<(), ApiError> {
        self.store.dispatch(Event::SetSort(sort));
        if sort.is_client_side() {
            return Ok(());
        }
        let selection = self.store.state().selection.clone();
        self.load_listing(&selection).await
    }

    /// Only refetches when the current sort honours a window.
    pub async fn change_time_window(&self, time_window: TimeWindow) -> Result<(), ApiError> {
        self.store.dispatch(Event::SetTimeWindow(time_window));
        let selection = self.store.state().selection.clone();
        if !selection.sort.uses_time_window() {
            return Ok(());
        }
        self.load_listing(&selection).await
    }

    /// Open a post from the listing and load its comments.
    pub async fn open_item(&self, post: Post) -> Result<(), ApiError> {
        let id = post.id.clone();
        let community = post.community.clone();
        self.store.dispatch(Event::SetCurrentItem(post));
        self.load_comments(&id, &community).await
    }

    pub fn close_item(&self) {
        self.store.dispatch(Event::ClearCurrentItem);
    }

    fn finish_listing(
        &self,
        key: RequestKey,
        result: Result<Vec<Post>, ApiError>,
    ) -> Result<(), ApiError> {
        match result {
            Ok(posts) => {
                let count = posts.len();
                if self.store.dispatch(Event::ListingSuccess {
                    key: key.clone(),
                    posts,
                }) {
                    tracing::info!(community = %key.community, sort = %key.sort, count, "Listing loaded");
                } else {
                    tracing::debug!(community = %key.community, "Listing superseded, dropped");
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(community = %key.community, kind = ?e.kind(), error = %e, "Listing failed");
                self.store.dispatch(Event::ListingFailure {
                    key,
                    message: e.user_message(),
                    kind: Some(e.kind()),
                });
                Err(e)
            }
        }
    }
}

fn bare_post_id(id: &str) -> String {
    let id = id.trim();
    id.strip_prefix("t3_").unwrap_or(id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::config::ApiConfig;
    use crate::domain::LoadStatus;
    use crate::fetcher::RateLimiter;
    use crate::mediator::ProxyMediator;
    use crate::store::selectors::visible_listing;
    use crate::test_support::{
        as_clock, comments_payload, listing_envelope, manual_clock, raw_comment, raw_post,
        ScriptedFetcher, Step,
    };
    use std::time::Duration;

    fn coordinator(fetcher: ScriptedFetcher) -> (Arc<ScriptedFetcher>, Coordinator) {
        let clock = manual_clock();
        let fetcher = Arc::new(fetcher);
        let config = ApiConfig::default();
        let mediator = Arc::new(ProxyMediator::new(
            fetcher.clone(),
            "http://proxy.test/api/reddit",
            Duration::from_millis(500),
        ));
        let client = Arc::new(ApiClient::new(
            mediator,
            Arc::new(TtlCache::new(as_clock(&clock))),
            Arc::new(RateLimiter::new(as_clock(&clock))),
            &config,
        ));
        let store = Arc::new(Store::new(Selection::new("LiverpoolFC")));
        (fetcher, Coordinator::new(client, store))
    }

    fn listing(ids: &[(&str, i64)]) -> Step {
        Step::value(&listing_envelope(
            ids.iter()
                .enumerate()
                .map(|(i, (id, score))| raw_post(id, *score, i as i64))
                .collect(),
        ))
    }

    #[tokio::test]
    async fn test_load_listing_success() {
        let (fetcher, c) = coordinator(
            ScriptedFetcher::default().route("hot.json", listing(&[("a1", 1), ("b2", 2)])),
        );
        c.load_listing(&Selection::new("LiverpoolFC")).await.unwrap();

        let state = c.store().state();
        assert_eq!(state.listing_status, LoadStatus::Ready);
        let ids: Vec<_> = state.listing.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a1", "b2"]);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_load_listing_failure_keeps_listing() {
        let (_, c) = coordinator(ScriptedFetcher::new(vec![
            listing(&[("a1", 1)]),
            Step::status(503),
        ]));
        c.load_listing(&Selection::new("LiverpoolFC")).await.unwrap();
        let err = c
            .load_listing(&Selection::new("LiverpoolFC").with_sort(Sort::New))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::UpstreamStatus(503));
        let state = c.store().state();
        assert_eq!(state.listing_status, LoadStatus::Error);
        assert_eq!(state.listing[0].id, "a1");
        assert_eq!(
            state.last_error.as_ref().map(|e| e.message.as_str()),
            Some("Failed to load content (HTTP 503).")
        );
    }

    #[tokio::test]
    async fn test_superseded_listing_dropped() {
        let (_, c) = coordinator(
            ScriptedFetcher::default()
                .route("hot.json", listing(&[("slow", 1)]).after(Duration::from_millis(40)))
                .route("new.json", listing(&[("fast", 1)])),
        );
        let hot = Selection::new("LiverpoolFC");
        let new = Selection::new("LiverpoolFC").with_sort(Sort::New);

        let (a, b) = tokio::join!(c.load_listing(&hot), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            c.load_listing(&new).await
        });
        a.unwrap();
        b.unwrap();

        let state = c.store().state();
        assert_eq!(state.selection.sort, Sort::New);
        assert_eq!(state.listing[0].id, "fast");
    }

    #[tokio::test]
    async fn test_viral_never_fetches() {
        let (fetcher, c) = coordinator(
            ScriptedFetcher::default().route("hot.json", listing(&[("a", 100), ("b", 2000), ("c", 500)])),
        );
        c.load_listing(&Selection::new("LiverpoolFC")).await.unwrap();
        c.change_sort(Sort::Viral).await.unwrap();
        c.load_listing(&Selection::new("LiverpoolFC").with_sort(Sort::Viral))
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        let state = c.store().state();
        let ids: Vec<_> = visible_listing(&state).iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_change_community_under_viral_fetches() {
        let (fetcher, c) = coordinator(
            ScriptedFetcher::default()
                .route("LiverpoolFC%2Fhot.json", listing(&[("lfc1", 10)]))
                .route("soccer%2Fhot.json", listing(&[("s1", 5), ("s2", 900)])),
        );
        c.load_listing(&Selection::new("LiverpoolFC")).await.unwrap();
        c.change_sort(Sort::Viral).await.unwrap();

        c.change_community("soccer").await.unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert!(fetcher.requested()[1].contains("soccer%2Fhot.json"));
        let state = c.store().state();
        assert_eq!(state.selection.community, "soccer");
        assert_eq!(state.selection.sort, Sort::Viral);
        assert_eq!(state.listing_status, LoadStatus::Ready);
        let ids: Vec<_> = visible_listing(&state).iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, ["s2", "s1"]);
    }

    #[tokio::test]
    async fn test_change_community_under_viral_failure_keeps_viral() {
        let (_, c) = coordinator(
            ScriptedFetcher::default()
                .route("LiverpoolFC%2Fhot.json", listing(&[("lfc1", 10)]))
                .route("soccer%2Fhot.json", Step::status(500)),
        );
        c.load_listing(&Selection::new("LiverpoolFC")).await.unwrap();
        c.change_sort(Sort::Viral).await.unwrap();

        let err = c.change_community("soccer").await.unwrap_err();

        assert_eq!(err, ApiError::UpstreamStatus(500));
        let state = c.store().state();
        assert_eq!(state.selection.sort, Sort::Viral);
        assert_eq!(state.listing_status, LoadStatus::Error);
    }

    #[tokio::test]
    async fn test_time_window_refetches_only_for_top() {
        let (fetcher, c) = coordinator(ScriptedFetcher::default().route(".json", listing(&[("a", 1)])));
        c.change_time_window(TimeWindow::Week).await.unwrap();
        assert_eq!(fetcher.calls(), 0);

        c.change_sort(Sort::Top).await.unwrap();
        c.change_time_window(TimeWindow::Year).await.unwrap();
        let requested = fetcher.requested();
        assert_eq!(requested.len(), 2);
        assert!(requested[0].contains("t=week"));
        assert!(requested[1].contains("t=year"));
    }

    #[tokio::test]
    async fn test_empty_search_no_network() {
        let (fetcher, c) = coordinator(ScriptedFetcher::default().route("hot.json", listing(&[("a", 1)])));
        c.load_listing(&Selection::new("LiverpoolFC")).await.unwrap();

        c.search_listing("   ", "LiverpoolFC").await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        let state = c.store().state();
        assert_eq!(state.selection.search_term, "");
        assert!(state.listing.is_empty());
        assert_eq!(state.listing_status, LoadStatus::Ready);
    }

    #[tokio::test]
    async fn test_search_sets_term_and_loads() {
        let (fetcher, c) =
            coordinator(ScriptedFetcher::default().route("search.json", listing(&[("s1", 1)])));
        c.search_listing(" salah ", "LiverpoolFC").await.unwrap();

        let state = c.store().state();
        assert_eq!(state.selection.search_term, "salah");
        assert_eq!(state.listing[0].id, "s1");
        assert!(fetcher.requested()[0].contains("q=salah"));
    }

    #[tokio::test]
    async fn test_repeated_search_same_state() {
        let (_, c) = coordinator(ScriptedFetcher::default().route("search.json", listing(&[("s1", 1)])));
        c.search_listing("salah", "LiverpoolFC").await.unwrap();
        let first = c.store().state();
        c.search_listing("salah", "LiverpoolFC").await.unwrap();
        assert_eq!(*first, *c.store().state());
    }

    #[tokio::test]
    async fn test_load_item_details() {
        let (fetcher, c) =
            coordinator(ScriptedFetcher::default().route("info.json", listing(&[("abc", 7)])));
        c.load_item_details("t3_abc").await.unwrap();

        let state = c.store().state();
        assert_eq!(state.current_item_id.as_deref(), Some("abc"));
        assert_eq!(state.current_item.as_ref().map(|p| p.score), Some(7));
        assert!(fetcher.requested()[0].contains("id=t3_abc"));
    }

    #[tokio::test]
    async fn test_load_item_details_not_found() {
        let (_, c) = coordinator(ScriptedFetcher::default().route("info.json", listing(&[])));
        let err = c.load_item_details("zzz").await.unwrap_err();

        assert_eq!(err, ApiError::NotFound);
        let state = c.store().state();
        assert_eq!(state.item_status, LoadStatus::Error);
        assert_eq!(state.last_error.as_ref().unwrap().message, "Post not found");
    }

    #[tokio::test]
    async fn test_open_item_loads_comments() {
        let payload = comments_payload(vec![raw_comment("c1", vec![raw_comment("c2", vec![])])]);
        let (_, c) = coordinator(ScriptedFetcher::default().route("comments", Step::value(&payload)));

        c.open_item(Post::new("p1", "LiverpoolFC")).await.unwrap();

        let state = c.store().state();
        assert_eq!(state.comments_status, LoadStatus::Ready);
        assert_eq!(state.comments.len(), 1);
        assert_eq!(state.comments[0].replies[0].depth, 1);

        c.close_item();
        assert!(c.store().state().comments.is_empty());
    }

    #[tokio::test]
    async fn test_comments_failure_recorded() {
        let (_, c) = coordinator(ScriptedFetcher::default().route("comments", Step::html("<html>")));
        let err = c.open_item(Post::new("p1", "LiverpoolFC")).await.unwrap_err();

        assert!(matches!(err, ApiError::MediatorDecode(_)));
        assert_eq!(c.store().state().comments_status, LoadStatus::Error);
    }
}
