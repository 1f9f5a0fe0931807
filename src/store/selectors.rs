//! Derived views over [`ContainerState`]. Pure and deterministic.

use std::collections::BTreeSet;

use crate::domain::{ContainerState, LegacyTagFilter, LoadStatus, MediaFilter, MediaKind, Post, Sort};

/// The posts to render: filters applied in order, then the viral reorder.
pub fn visible_listing(state: &ContainerState) -> Vec<&Post> {
    let selection = &state.selection;
    let mut posts: Vec<&Post> = state
        .listing
        .iter()
        .filter(|post| matches_legacy_tag(post, selection.legacy_tag_filter))
        .filter(|post| matches_tags(post, &selection.tag_filters))
        .filter(|post| matches_media(post, selection.media_filter))
        .collect();

    if selection.sort == Sort::Viral {
        sort_viral(&mut posts);
    }
    posts
}

/// Score descending, newest first on ties. Stable.
pub fn sort_viral(posts: &mut [&Post]) {
    posts.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.created_utc.cmp(&a.created_utc))
    });
}

pub fn matches_legacy_tag(post: &Post, filter: LegacyTagFilter) -> bool {
    if filter == LegacyTagFilter::None {
        return true;
    }
    let Some(tag) = post.tag() else {
        return false;
    };
    let tag = tag.to_lowercase();
    filter.keywords().iter().any(|keyword| tag.contains(keyword))
}

pub fn matches_tags(post: &Post, tags: &BTreeSet<String>) -> bool {
    tags.is_empty() || post.tag().is_some_and(|tag| tags.contains(tag))
}

pub fn matches_media(post: &Post, filter: MediaFilter) -> bool {
    match filter {
        MediaFilter::None => true,
        MediaFilter::Images => matches!(post.media, MediaKind::Image | MediaKind::Gallery),
        MediaFilter::Videos => post.media == MediaKind::Video,
        MediaFilter::Articles => post.media == MediaKind::Link,
        MediaFilter::Discussions => matches!(post.media, MediaKind::SelfText | MediaKind::None),
    }
}

/// Distinct tag labels in the current listing, sorted.
pub fn available_tags(state: &ContainerState) -> Vec<&str> {
    state
        .listing
        .iter()
        .filter_map(Post::tag)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    NoSearchResults { term: String },
    FilteredOut,
    NoPosts,
}

impl EmptyState {
    pub fn message(&self) -> String {
        match self {
            EmptyState::NoSearchResults { term } => format!("No posts found for \"{term}\""),
            EmptyState::FilteredOut => "No posts match the selected filters".to_string(),
            EmptyState::NoPosts => "No posts to show".to_string(),
        }
    }
}

/// Why nothing is visible, once the listing has loaded and nothing passes.
pub fn empty_state(state: &ContainerState) -> Option<EmptyState> {
    if state.listing_status != LoadStatus::Ready || !visible_listing(state).is_empty() {
        return None;
    }
    if state.listing.is_empty() {
        if state.is_searching() {
            return Some(EmptyState::NoSearchResults {
                term: state.selection.search_term.clone(),
            });
        }
        return Some(EmptyState::NoPosts);
    }
    Some(EmptyState::FilteredOut)
}
