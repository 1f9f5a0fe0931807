//! Converts raw upstream payloads into [`Post`] and [`Comment`] records.
//!
//! This is the only place untrusted upstream shapes are interpreted.
//! Children that cannot be read are dropped and logged; only envelopes
//! with the wrong overall shape are errors.

mod raw;

use std::collections::HashSet;

use html_escape::decode_html_entities;
use serde_json::Value;

use crate::app::ApiError;
use crate::domain::{
    Comment, CommentFlags, Distinguished, Flair, GalleryImage, MediaKind, Post, PostFlags,
    PreviewImage, VideoInfo,
};
use raw::{RawComment, RawMedia, RawPost, RawRedditVideo};

const COMMENT_KIND: &str = "t1";

/// Thumbnail values that mean "no thumbnail".
const THUMBNAIL_SENTINELS: [&str; 2] = ["self", "default"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// `{ data: { children: [...] } }` → posts in upstream order, without
    /// unreadable children or repeated ids.
    pub fn normalize_listing(&self, payload: &Value) -> Result<Vec<Post>, ApiError> {
        let children = listing_children(payload)
            .ok_or_else(|| ApiError::Payload("listing has no data.children array".into()))?;

        let mut seen = HashSet::new();
        let posts = children
            .iter()
            .filter_map(|child| self.normalize_post(child))
            .filter(|post| {
                let fresh = seen.insert(post.id.clone());
                if !fresh {
                    tracing::debug!(id = %post.id, "Dropping repeated post");
                }
                fresh
            })
            .collect();

        Ok(posts)
    }

    /// Single-item lookup: same envelope as a listing, first child wins.
    pub fn normalize_info(&self, payload: &Value) -> Result<Post, ApiError> {
        let mut posts = self.normalize_listing(payload)?;
        if posts.len() > 1 {
            tracing::warn!(count = posts.len(), "Info lookup returned several posts, using the first");
        }
        if posts.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(posts.swap_remove(0))
    }

    /// Normalize one listing child (`{ kind, data }`).
    pub fn normalize_post(&self, child: &Value) -> Option<Post> {
        let data = child.get("data")?;
        let raw: RawPost = match serde_json::from_value(data.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable post");
                return None;
            }
        };
        let id = raw.id.clone().filter(|id| !id.is_empty())?;

        let preview = preview_images(&raw);
        let video = reddit_video(&raw).and_then(video_info);
        let gallery = gallery_images(&raw);
        let is_self = raw.is_self.unwrap_or(false);
        let media = classify(&raw, !preview.is_empty(), video.is_some());

        Some(Post {
            id,
            community: raw.subreddit.unwrap_or_default(),
            title: raw
                .title
                .map(|t| decode_html_entities(&t).into_owned())
                .unwrap_or_default(),
            author: raw.author.unwrap_or_else(|| "[deleted]".to_string()),
            score: raw.score.unwrap_or(0.0) as i64,
            num_comments: raw.num_comments.unwrap_or(0.0) as i64,
            created_utc: raw.created_utc.unwrap_or(0.0) as i64,
            body: raw.selftext.filter(|s| !s.is_empty()),
            url: raw.url.filter(|u| !u.is_empty()),
            permalink: raw.permalink,
            domain: raw.domain,
            upvote_ratio: raw.upvote_ratio,
            media,
            thumbnail: raw
                .thumbnail
                .filter(|t| !t.is_empty() && !THUMBNAIL_SENTINELS.contains(&t.as_str())),
            preview,
            video,
            gallery,
            flair: raw
                .link_flair_text
                .filter(|t| !t.trim().is_empty())
                .map(|text| Flair {
                    text,
                    text_color: raw.link_flair_text_color.filter(|c| !c.is_empty()),
                    background_color: raw.link_flair_background_color.filter(|c| !c.is_empty()),
                }),
            flags: PostFlags {
                pinned: raw.stickied.unwrap_or(false),
                spoiler: raw.spoiler.unwrap_or(false),
                adult: raw.over_18.unwrap_or(false),
                is_self,
            },
        })
    }

    /// Normalize one comment node. Non-comment nodes (such as "load more"
    /// placeholders) yield `None`.
    pub fn normalize_comment(&self, node: &Value, depth: usize) -> Option<Comment> {
        if node.get("kind").and_then(Value::as_str) != Some(COMMENT_KIND) {
            return None;
        }
        let data = node.get("data")?;
        let raw: RawComment = match serde_json::from_value(data.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable comment");
                return None;
            }
        };
        let id = raw.id.filter(|id| !id.is_empty())?;

        let replies = listing_children(&raw.replies)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| self.normalize_comment(child, depth + 1))
                    .collect()
            })
            .unwrap_or_default();

        Some(Comment {
            id,
            author: raw.author.unwrap_or_else(|| "[deleted]".to_string()),
            body: raw.body.unwrap_or_default(),
            score: raw.score.unwrap_or(0.0) as i64,
            created_utc: raw.created_utc.unwrap_or(0.0) as i64,
            edited_utc: raw.edited.as_f64().map(|t| t as i64),
            flags: CommentFlags {
                is_op: raw.is_submitter.unwrap_or(false),
                pinned: raw.stickied.unwrap_or(false),
            },
            distinguished: raw.distinguished.as_deref().map(Distinguished::parse),
            depth,
            replies,
        })
    }

    /// `[post echo, comment listing]` → root comments at depth 0.
    pub fn normalize_comments(&self, payload: &Value) -> Result<Vec<Comment>, ApiError> {
        let listing = payload
            .as_array()
            .and_then(|parts| parts.get(1))
            .ok_or_else(|| ApiError::Payload("comments payload is not a two-part array".into()))?;
        let children = listing_children(listing)
            .ok_or_else(|| ApiError::Payload("comment listing has no data.children array".into()))?;

        Ok(children
            .iter()
            .filter_map(|child| self.normalize_comment(child, 0))
            .collect())
    }
}

fn listing_children(value: &Value) -> Option<&Vec<Value>> {
    value.get("data")?.get("children")?.as_array()
}

fn decode_url(url: &str) -> String {
    decode_html_entities(url).into_owned()
}

fn classify(raw: &RawPost, has_preview: bool, has_video: bool) -> MediaKind {
    if raw.is_gallery.unwrap_or(false) {
        MediaKind::Gallery
    } else if raw.is_video.unwrap_or(false) && has_video {
        MediaKind::Video
    } else if has_preview {
        MediaKind::Image
    } else if raw.post_hint.as_deref() == Some("link") {
        MediaKind::Link
    } else if raw.is_self.unwrap_or(false) {
        MediaKind::SelfText
    } else {
        MediaKind::None
    }
}

/// Renditions of the first preview image, smallest first, source last.
fn preview_images(raw: &RawPost) -> Vec<PreviewImage> {
    let Some(image) = raw.preview.as_ref().and_then(|p| p.images.first()) else {
        return Vec::new();
    };
    image
        .resolutions
        .iter()
        .chain(image.source.iter())
        .filter_map(|src| {
            Some(PreviewImage {
                url: decode_url(src.url.as_deref()?),
                width: src.width.unwrap_or(0),
                height: src.height.unwrap_or(0),
            })
        })
        .collect()
}

fn reddit_video(raw: &RawPost) -> Option<&RawRedditVideo> {
    [raw.secure_media.as_ref(), raw.media.as_ref()]
        .into_iter()
        .flatten()
        .find_map(|m: &RawMedia| m.reddit_video.as_ref())
}

fn video_info(video: &RawRedditVideo) -> Option<VideoInfo> {
    let progressive_url = video.fallback_url.as_deref().filter(|u| !u.is_empty())?;
    Some(VideoInfo {
        adaptive_url: video
            .hls_url
            .as_deref()
            .or(video.dash_url.as_deref())
            .map(decode_url),
        progressive_url: decode_url(progressive_url),
        has_audio: video.has_audio.unwrap_or(false),
        duration_secs: video.duration.map(|d| d as u32),
    })
}

/// Gallery order comes from `gallery_data`; URLs are resolved through
/// `media_metadata`. Items without a usable rendition are skipped.
fn gallery_images(raw: &RawPost) -> Vec<GalleryImage> {
    let (Some(gallery), Some(metadata)) = (&raw.gallery_data, &raw.media_metadata) else {
        return Vec::new();
    };
    gallery
        .items
        .iter()
        .filter_map(|item| {
            let media_id = item.media_id.as_ref()?;
            let meta = metadata.get(media_id)?;
            if meta.status.as_deref().is_some_and(|s| s != "valid") {
                return None;
            }
            let source = meta.s.as_ref()?;
            let url = source.u.as_deref().or(source.gif.as_deref())?;
            Some(GalleryImage {
                media_id: media_id.clone(),
                url: decode_url(url),
                width: source.x,
                height: source.y,
                caption: item.caption.clone().filter(|c| !c.is_empty()),
            })
        })
        .collect()
}
