pub mod comment;
pub mod post;
pub mod selection;
pub mod state;

pub use comment::{count_all, Comment, CommentFlags, Distinguished};
pub use post::{Flair, GalleryImage, MediaKind, Post, PostFlags, PreviewImage, VideoInfo};
pub use selection::{LegacyTagFilter, MediaFilter, RequestKey, Selection, Sort, TimeWindow};
pub use state::{ContainerState, Failure, FailureScope, LoadStatus};
