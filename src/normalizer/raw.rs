//! Upstream JSON shapes. Every field the upstream may omit or null is
//! optional here, so one odd record cannot fail a whole listing.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPost {
    pub id: Option<String>,
    pub subreddit: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub score: Option<f64>,
    pub num_comments: Option<f64>,
    pub created_utc: Option<f64>,
    pub selftext: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub domain: Option<String>,
    pub upvote_ratio: Option<f64>,
    pub thumbnail: Option<String>,
    pub is_gallery: Option<bool>,
    pub is_video: Option<bool>,
    pub is_self: Option<bool>,
    pub post_hint: Option<String>,
    pub preview: Option<RawPreview>,
    pub media: Option<RawMedia>,
    pub secure_media: Option<RawMedia>,
    pub gallery_data: Option<RawGalleryData>,
    pub media_metadata: Option<HashMap<String, RawMediaMetadata>>,
    pub link_flair_text: Option<String>,
    pub link_flair_text_color: Option<String>,
    pub link_flair_background_color: Option<String>,
    pub stickied: Option<bool>,
    pub spoiler: Option<bool>,
    pub over_18: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPreview {
    pub images: Vec<RawPreviewImage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPreviewImage {
    pub source: Option<RawImageSource>,
    pub resolutions: Vec<RawImageSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawImageSource {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawMedia {
    pub reddit_video: Option<RawRedditVideo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawRedditVideo {
    pub fallback_url: Option<String>,
    pub hls_url: Option<String>,
    pub dash_url: Option<String>,
    pub has_audio: Option<bool>,
    pub duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawGalleryData {
    pub items: Vec<RawGalleryItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawGalleryItem {
    pub media_id: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawMediaMetadata {
    pub status: Option<String>,
    /// Largest rendition
    pub s: Option<RawMetadataSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawMetadataSource {
    pub u: Option<String>,
    pub gif: Option<String>,
    pub x: Option<u32>,
    pub y: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawComment {
    pub id: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub score: Option<f64>,
    pub created_utc: Option<f64>,
    /// `false` or seconds since epoch
    pub edited: Value,
    pub is_submitter: Option<bool>,
    pub stickied: Option<bool>,
    pub distinguished: Option<String>,
    /// `""` when there are no replies, otherwise a listing
    pub replies: Value,
}
