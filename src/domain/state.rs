use crate::app::ErrorKind;
use crate::domain::{Comment, Post, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Which part of the view a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    Listing,
    Item,
    Comments,
}

/// A failure as recorded in the container: user-facing text plus the
/// original kind for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub scope: FailureScope,
    pub message: String,
    pub kind: Option<ErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerState {
    pub selection: Selection,
    pub listing_status: LoadStatus,
    pub listing: Vec<Post>,
    pub current_item_id: Option<String>,
    pub current_item: Option<Post>,
    pub item_status: LoadStatus,
    /// Item the current comment stream belongs to
    pub comments_item_id: Option<String>,
    pub comments_status: LoadStatus,
    pub comments: Vec<Comment>,
    pub last_error: Option<Failure>,
}

impl ContainerState {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            ..Default::default()
        }
    }

    pub fn is_searching(&self) -> bool {
        !self.selection.search_term.is_empty()
    }
}
