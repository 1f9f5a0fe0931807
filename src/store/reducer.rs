//! Pure state transitions. No I/O, no side effects.

use crate::domain::{ContainerState, Failure, FailureScope, LoadStatus, RequestKey, Sort};
use crate::store::Event;

/// Apply `event` to `state`. Returns `None` when the event is a late
/// response for a request the state has moved past; the caller keeps the
/// prior state.
pub fn reduce(state: &ContainerState, event: Event) -> Option<ContainerState> {
    let mut next = state.clone();

    match event {
        Event::SetCommunity(community) => {
            next.selection.community = community;
        }
        Event::SetSort(sort) => {
            next.selection.sort = sort;
        }
        Event::SetTimeWindow(time_window) => {
            next.selection.time_window = time_window;
        }
        Event::SetSearchTerm(term) => {
            next.selection.search_term = term;
        }
        Event::ToggleTagFilter(tag) => {
            if !next.selection.tag_filters.remove(&tag) {
                next.selection.tag_filters.insert(tag);
            }
        }
        Event::ClearTagFilters => {
            next.selection.tag_filters.clear();
        }
        Event::SetMediaFilter(filter) => {
            next.selection.media_filter = filter;
        }
        Event::SetLegacyTagFilter(filter) => {
            next.selection.legacy_tag_filter = filter;
        }
        Event::SortByViral => {
            next.selection.sort = Sort::Viral;
        }

        Event::ListingRequest(key) | Event::SearchRequest(key) => {
            apply_request_key(&mut next, key);
            next.listing_status = LoadStatus::Loading;
            clear_error(&mut next, FailureScope::Listing);
        }
        Event::ListingSuccess { key, posts } => {
            if is_stale(state, &key) {
                return None;
            }
            next.listing = posts;
            next.listing_status = LoadStatus::Ready;
            clear_error(&mut next, FailureScope::Listing);
        }
        Event::ListingFailure { key, message, kind } => {
            if is_stale(state, &key) {
                return None;
            }
            next.listing_status = LoadStatus::Error;
            next.last_error = Some(Failure {
                scope: FailureScope::Listing,
                message,
                kind,
            });
        }

        Event::SetCurrentItem(post) => {
            open_item(&mut next, &post.id);
            next.current_item = Some(post);
            next.item_status = LoadStatus::Ready;
        }
        Event::ClearCurrentItem => {
            next.current_item_id = None;
            next.current_item = None;
            next.item_status = LoadStatus::Idle;
            next.comments_item_id = None;
            next.comments.clear();
            next.comments_status = LoadStatus::Idle;
            clear_error(&mut next, FailureScope::Item);
            clear_error(&mut next, FailureScope::Comments);
        }
        Event::ItemRequest { id } => {
            open_item(&mut next, &id);
            next.item_status = LoadStatus::Loading;
            clear_error(&mut next, FailureScope::Item);
        }
        Event::ItemSuccess(post) => {
            if state.current_item_id.as_deref() != Some(post.id.as_str()) {
                return None;
            }
            next.current_item = Some(post);
            next.item_status = LoadStatus::Ready;
            clear_error(&mut next, FailureScope::Item);
        }
        Event::ItemFailure { id, message, kind } => {
            if state.current_item_id.as_deref() != Some(id.as_str()) {
                return None;
            }
            next.item_status = LoadStatus::Error;
            next.last_error = Some(Failure {
                scope: FailureScope::Item,
                message,
                kind,
            });
        }

        Event::CommentsRequest { item_id } => {
            if next.comments_item_id.as_deref() != Some(item_id.as_str()) {
                next.comments.clear();
            }
            next.comments_item_id = Some(item_id);
            next.comments_status = LoadStatus::Loading;
            clear_error(&mut next, FailureScope::Comments);
        }
        Event::CommentsSuccess { item_id, comments } => {
            if state.comments_item_id.as_deref() != Some(item_id.as_str()) {
                return None;
            }
            next.comments = comments;
            next.comments_status = LoadStatus::Ready;
            clear_error(&mut next, FailureScope::Comments);
        }
        Event::CommentsFailure {
            item_id,
            message,
            kind,
        } => {
            if state.comments_item_id.as_deref() != Some(item_id.as_str()) {
                return None;
            }
            next.comments_status = LoadStatus::Error;
            next.last_error = Some(Failure {
                scope: FailureScope::Comments,
                message,
                kind,
            });
        }
    }

    Some(next)
}

/// Like [`reduce`], but a discarded event yields an unchanged copy.
pub fn apply(state: &ContainerState, event: Event) -> ContainerState {
    reduce(state, event).unwrap_or_else(|| state.clone())
}

fn is_stale(state: &ContainerState, key: &RequestKey) -> bool {
    state.selection.request_key() != *key
}

fn apply_request_key(state: &mut ContainerState, key: RequestKey) {
    state.selection.community = key.community;
    state.selection.sort = key.sort;
    if let Some(time_window) = key.time_window {
        state.selection.time_window = time_window;
    }
    state.selection.search_term = key.search_term;
}

/// Point the container at item `id`, dropping comments that belong to a
/// different item.
fn open_item(state: &mut ContainerState, id: &str) {
    if state.current_item_id.as_deref() != Some(id) {
        state.current_item = None;
    }
    state.current_item_id = Some(id.to_string());
    if state.comments_item_id.as_deref() != Some(id) {
        state.comments_item_id = None;
        state.comments.clear();
        state.comments_status = LoadStatus::Idle;
    }
}

fn clear_error(state: &mut ContainerState, scope: FailureScope) {
    if state.last_error.as_ref().is_some_and(|e| e.scope == scope) {
        state.last_error = None;
    }
}
