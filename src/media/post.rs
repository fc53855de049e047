//! Post representation.

use serde::Serialize;

/// A post as returned by the feed, classified by the fields it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Post {
    /// A post carrying its own photo URLs (largest rendition first).
    Plain(PlainPost),
    /// A post bundling several photos.
    Photoset(PhotosetPost),
    /// A post carrying video player embeds.
    Video(VideoPost),
}

/// Post with a flat list of photo URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlainPost {
    /// Post ID, or the photo's offset (`o1`, `o2`, ...) for photoset members.
    pub id: String,

    /// Photo URLs in feed order.
    pub photo_urls: Vec<String>,
}

/// Post with nested photos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhotosetPost {
    pub id: String,
    pub photos: Vec<PlainPost>,
}

/// Post with video player embed markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoPost {
    pub id: String,

    /// Embed blobs in feed order, one per player width.
    pub players: Vec<String>,
}

impl Post {
    /// The post's ID.
    pub fn id(&self) -> &str {
        match self {
            Post::Plain(p) => &p.id,
            Post::Photoset(p) => &p.id,
            Post::Video(p) => &p.id,
        }
    }
}

impl From<PlainPost> for Post {
    fn from(post: PlainPost) -> Self {
        Post::Plain(post)
    }
}
