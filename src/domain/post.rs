use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How a post's main content should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    None,
    Image,
    Gallery,
    Video,
    Link,
    #[serde(rename = "self")]
    SelfText,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::None => "none",
            MediaKind::Image => "image",
            MediaKind::Gallery => "gallery",
            MediaKind::Video => "video",
            MediaKind::Link => "link",
            MediaKind::SelfText => "self",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// HLS/DASH playlist, when the upstream offers one
    pub adaptive_url: Option<String>,
    pub progressive_url: String,
    pub has_audio: bool,
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub media_id: String,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flair {
    pub text: String,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostFlags {
    pub pinned: bool,
    pub spoiler: bool,
    pub adult: bool,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub community: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub num_comments: i64,
    /// Seconds since the Unix epoch
    pub created_utc: i64,
    pub body: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub domain: Option<String>,
    pub upvote_ratio: Option<f64>,
    pub media: MediaKind,
    pub thumbnail: Option<String>,
    pub preview: Vec<PreviewImage>,
    pub video: Option<VideoInfo>,
    pub gallery: Vec<GalleryImage>,
    pub flair: Option<Flair>,
    pub flags: PostFlags,
}

impl Post {
    pub fn new(id: impl Into<String>, community: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            community: community.into(),
            title: String::new(),
            author: String::new(),
            score: 0,
            num_comments: 0,
            created_utc: 0,
            body: None,
            url: None,
            permalink: None,
            domain: None,
            upvote_ratio: None,
            media: MediaKind::None,
            thumbnail: None,
            preview: Vec::new(),
            video: None,
            gallery: Vec::new(),
            flair: None,
            flags: PostFlags::default(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_utc, 0).single()
    }

    pub fn tag(&self) -> Option<&str> {
        self.flair.as_ref().map(|f| f.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_fallback() {
        let mut post = Post::new("a1", "LiverpoolFC");
        assert_eq!(post.display_title(), "(Untitled)");
        post.title = "Match Thread".into();
        assert_eq!(post.display_title(), "Match Thread");
    }

    #[test]
    fn test_created_at() {
        let mut post = Post::new("a1", "LiverpoolFC");
        post.created_utc = 1_700_000_000;
        let created = post.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_media_kind_serializes_self() {
        let json = serde_json::to_string(&MediaKind::SelfText).unwrap();
        assert_eq!(json, "\"self\"");
        assert_eq!(MediaKind::Gallery.label(), "gallery");
    }
}
