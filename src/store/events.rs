use crate::app::ErrorKind;
use crate::domain::{Comment, LegacyTagFilter, MediaFilter, Post, RequestKey, Sort, TimeWindow};

/// Every way the container state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SetCommunity(String),
    SetSort(Sort),
    SetTimeWindow(TimeWindow),
    SetSearchTerm(String),
    ToggleTagFilter(String),
    ClearTagFilters,
    SetMediaFilter(MediaFilter),
    SetLegacyTagFilter(LegacyTagFilter),
    SortByViral,

    ListingRequest(RequestKey),
    SearchRequest(RequestKey),
    ListingSuccess {
        key: RequestKey,
        posts: Vec<Post>,
    },
    ListingFailure {
        key: RequestKey,
        message: String,
        kind: Option<ErrorKind>,
    },

    /// Open a post the caller already holds.
    SetCurrentItem(Post),
    ClearCurrentItem,
    ItemRequest {
        id: String,
    },
    ItemSuccess(Post),
    ItemFailure {
        id: String,
        message: String,
        kind: Option<ErrorKind>,
    },

    CommentsRequest {
        item_id: String,
    },
    CommentsSuccess {
        item_id: String,
        comments: Vec<Comment>,
    },
    CommentsFailure {
        item_id: String,
        message: String,
        kind: Option<ErrorKind>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SetCommunity(_) => "SET_COMMUNITY",
            Event::SetSort(_) => "SET_SORT",
            Event::SetTimeWindow(_) => "SET_TIME_WINDOW",
            Event::SetSearchTerm(_) => "SET_SEARCH_TERM",
            Event::ToggleTagFilter(_) => "TOGGLE_TAG_FILTER",
            Event::ClearTagFilters => "CLEAR_TAG_FILTERS",
            Event::SetMediaFilter(_) => "SET_MEDIA_FILTER",
            Event::SetLegacyTagFilter(_) => "SET_LEGACY_TAG_FILTER",
            Event::SortByViral => "SORT_BY_VIRAL",
            Event::ListingRequest(_) => "LISTING_REQUEST",
            Event::SearchRequest(_) => "SEARCH_REQUEST",
            Event::ListingSuccess { .. } => "LISTING_SUCCESS",
            Event::ListingFailure { .. } => "LISTING_FAILURE",
            Event::SetCurrentItem(_) => "SET_CURRENT_ITEM",
            Event::ClearCurrentItem => "CLEAR_CURRENT_ITEM",
            Event::ItemRequest { .. } => "ITEM_REQUEST",
            Event::ItemSuccess(_) => "ITEM_SUCCESS",
            Event::ItemFailure { .. } => "ITEM_FAILURE",
            Event::CommentsRequest { .. } => "COMMENTS_REQUEST",
            Event::CommentsSuccess { .. } => "COMMENTS_SUCCESS",
            Event::CommentsFailure { .. } => "COMMENTS_FAILURE",
        }
    }
}
