//! Download tasks and feed cursors.

use std::path::{Path, PathBuf};

use crate::media::{MediaKind, Post};

/// One unit of work for the worker pool.
///
/// Created while flattening a feed page and consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub kind: MediaKind,
    pub post: Post,
    pub site: String,
    pub destination: PathBuf,
}

/// Position of a feed walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub site: String,
    pub kind: MediaKind,
    pub offset: u64,
    pub page_size: u32,
}

impl PageCursor {
    pub fn new(site: &str, kind: MediaKind, offset: u64, page_size: u32) -> Self {
        Self {
            site: site.to_string(),
            kind,
            offset,
            page_size,
        }
    }

    /// Move to the next page.
    pub fn advance(&mut self) {
        self.offset += self.page_size as u64;
    }
}

/// Turn one post into its download tasks.
///
/// Photosets yield one photo task per member, whatever kind the feed was walked for;
/// every other post yields a single task of the walked kind.
pub fn flatten_post(
    kind: MediaKind,
    post: Post,
    site: &str,
    destination: &Path,
) -> Vec<DownloadTask> {
    let task = |kind, post| DownloadTask {
        kind,
        post,
        site: site.to_string(),
        destination: destination.to_path_buf(),
    };

    match post {
        Post::Photoset(set) => set
            .photos
            .into_iter()
            .map(|photo| task(MediaKind::Photo, Post::Plain(photo)))
            .collect(),
        post @ (Post::Plain(_) | Post::Video(_)) => vec![task(kind, post)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{PhotosetPost, PlainPost, VideoPost};

    fn photo(id: &str) -> PlainPost {
        PlainPost {
            id: id.into(),
            photo_urls: vec![format!("https://a/{}.jpg", id)],
        }
    }

    #[test]
    fn test_photoset_yields_one_photo_task_per_member() {
        let dest = PathBuf::from("/tmp/staff");
        for k in 1..=4 {
            let set = Post::Photoset(PhotosetPost {
                id: "outer".into(),
                photos: (0..k).map(|i| photo(&format!("o{}", i + 1))).collect(),
            });

            let tasks = flatten_post(MediaKind::Video, set, "staff", &dest);
            assert_eq!(tasks.len(), k);
            assert!(tasks.iter().all(|t| t.kind == MediaKind::Photo));
            assert!(tasks.iter().all(|t| t.post.id() != "outer"));
        }
    }

    #[test]
    fn test_plain_and_video_posts_keep_walked_kind() {
        let dest = PathBuf::from("/tmp/staff");
        let tasks = flatten_post(MediaKind::Photo, Post::Plain(photo("1")), "staff", &dest);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, MediaKind::Photo);
        assert_eq!(tasks[0].destination, dest);

        let video = Post::Video(VideoPost {
            id: "2".into(),
            players: vec![],
        });
        let tasks = flatten_post(MediaKind::Video, video, "staff", &dest);
        assert_eq!(tasks[0].kind, MediaKind::Video);
        assert_eq!(tasks[0].site, "staff");
    }

    #[test]
    fn test_cursor_advances_by_page_size() {
        let mut cursor = PageCursor::new("staff", MediaKind::Photo, 0, 50);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.offset, 100);
    }
}
