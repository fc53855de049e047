//! Feed page parsing.
//!
//! A page from `api/read` looks like:
//!
//! ```xml
//! <tumblr version="1.0">
//!   <posts start="0" total="2">
//!     <post id="1" type="photo">
//!       <photo-url max-width="1280">https://64.media.tumblr.com/a/tumblr_a_1280.jpg</photo-url>
//!       <photoset>
//!         <photo offset="o1"><photo-url max-width="1280">...</photo-url></photo>
//!       </photoset>
//!     </post>
//!     <post id="2" type="video">
//!       <video-player>...</video-player>
//!       <video-player max-width="400">&lt;video ...&gt;</video-player>
//!     </post>
//!   </posts>
//! </tumblr>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Error, Result};
use crate::media::post::{PhotosetPost, PlainPost, Post, VideoPost};

/// Parse one feed page into its ordered list of posts.
///
/// Returns [`Error::FeedDecode`] when the body is not UTF-8 or not well-formed XML,
/// and [`Error::FeedParse`] when the document has no post list.
pub fn parse_feed_page(body: &[u8]) -> Result<Vec<Post>> {
    let text = std::str::from_utf8(body).map_err(|e| Error::FeedDecode(e.to_string()))?;

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut posts = Vec::new();
    let mut saw_post_list = false;

    let mut current_post: Option<PostBuilder> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                path.push(name);
                current_text.clear();
                on_open(&path, &e, &mut current_post, &mut saw_post_list);
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                path.push(name);
                current_text.clear();
                on_open(&path, &e, &mut current_post, &mut saw_post_list);
                on_close(&path, &mut current_text, &mut current_post, &mut posts);
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::FeedDecode(format!("bad escape: {}", e)))?;
                current_text.push_str(&text);
            }
            Ok(Event::CData(e)) => {
                current_text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(_)) => {
                on_close(&path, &mut current_text, &mut current_post, &mut posts);
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::FeedDecode(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !saw_post_list || posts.is_empty() {
        return Err(Error::FeedParse("no posts in page".into()));
    }

    Ok(posts)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .and_then(|attr| attr.unescape_value().ok())
        .map(|v| v.to_string())
}

/// Relative path of the open element inside the current `<post>`.
fn post_relative(path: &[String]) -> Option<Vec<&str>> {
    let post_idx = path.iter().position(|n| n == "post")?;
    if post_idx != 2 || path[0] != "tumblr" || path[1] != "posts" {
        return None;
    }
    Some(path[post_idx + 1..].iter().map(String::as_str).collect())
}

fn on_open(
    path: &[String],
    e: &BytesStart<'_>,
    current_post: &mut Option<PostBuilder>,
    saw_post_list: &mut bool,
) {
    match path.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["tumblr", "posts"] => *saw_post_list = true,
        ["tumblr", "posts", "post"] => {
            *current_post = Some(PostBuilder {
                id: attribute(e, "id").unwrap_or_default(),
                ..Default::default()
            });
        }
        _ => {
            let (Some(rel), Some(post)) = (post_relative(path), current_post.as_mut()) else {
                return;
            };
            match rel.as_slice() {
                ["photoset"] => post.has_photoset = true,
                ["photoset", "photo"] => post.photoset.push(PlainPost {
                    id: attribute(e, "offset").unwrap_or_default(),
                    photo_urls: Vec::new(),
                }),
                _ => {}
            }
        }
    }
}

fn on_close(
    path: &[String],
    current_text: &mut String,
    current_post: &mut Option<PostBuilder>,
    posts: &mut Vec<Post>,
) {
    let text = std::mem::take(current_text);

    if path.len() == 3 && path[2] == "post" {
        if let Some(builder) = current_post.take() {
            posts.push(builder.build());
        }
        return;
    }

    let (Some(rel), Some(post)) = (post_relative(path), current_post.as_mut()) else {
        return;
    };
    match rel.as_slice() {
        ["photo-url"] => post.photo_urls.push(text),
        ["video-player"] => post.players.push(text),
        ["photoset", "photo", "photo-url"] => {
            if let Some(photo) = post.photoset.last_mut() {
                photo.photo_urls.push(text);
            }
        }
        _ => {}
    }
}

#[derive(Default)]
struct PostBuilder {
    id: String,
    photo_urls: Vec<String>,
    players: Vec<String>,
    has_photoset: bool,
    photoset: Vec<PlainPost>,
}

impl PostBuilder {
    /// Classify the post by the fields it carries: a non-empty photoset wins, then
    /// video players, then plain photo URLs.
    fn build(self) -> Post {
        if self.has_photoset && !self.photoset.is_empty() {
            Post::Photoset(PhotosetPost {
                id: self.id,
                photos: self.photoset,
            })
        } else if !self.players.is_empty() {
            Post::Video(VideoPost {
                id: self.id,
                players: self.players,
            })
        } else {
            Post::Plain(PlainPost {
                id: self.id,
                photo_urls: self.photo_urls,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tumblr version="1.0">
  <tumblelog name="demo" timezone="US/Eastern" title="Demo"/>
  <posts start="0" total="3">
    <post id="101" type="photo" slug="one">
      <photo-caption>hello</photo-caption>
      <photo-url max-width="1280">https://64.media.tumblr.com/aa/tumblr_one_1280.jpg</photo-url>
      <photo-url max-width="500">https://64.media.tumblr.com/aa/tumblr_one_500.jpg</photo-url>
    </post>
    <post id="102" type="photo">
      <photo-url max-width="1280">https://64.media.tumblr.com/bb/tumblr_cover_1280.jpg</photo-url>
      <photoset>
        <photo offset="o1" caption="">
          <photo-url max-width="1280">https://64.media.tumblr.com/bb/tumblr_set1_1280.jpg</photo-url>
        </photo>
        <photo offset="o2" caption="">
          <photo-url max-width="1280">https://64.media.tumblr.com/bb/tumblr_set2_1280.png</photo-url>
          <photo-url max-width="500">https://64.media.tumblr.com/bb/tumblr_set2_500.png</photo-url>
        </photo>
      </photoset>
    </post>
    <post id="103" type="video">
      <video-player>&lt;iframe src="x"&gt;&lt;/iframe&gt;</video-player>
      <video-player max-width="400">&lt;video width="400" data-crt-options='{"hdUrl":false,"filmstrip":{}}'&gt;&lt;source src="https://vtt.tumblr.com/tumblr_vid.mp4" type="video/mp4"&gt;</video-player>
    </post>
  </posts>
</tumblr>"#;

    #[test]
    fn test_parse_classifies_post_shapes() {
        let posts = parse_feed_page(PAGE.as_bytes()).unwrap();
        assert_eq!(posts.len(), 3);

        match &posts[0] {
            Post::Plain(p) => {
                assert_eq!(p.id, "101");
                assert_eq!(
                    p.photo_urls[0],
                    "https://64.media.tumblr.com/aa/tumblr_one_1280.jpg"
                );
                assert_eq!(p.photo_urls.len(), 2);
            }
            other => panic!("expected plain post, got {:?}", other),
        }

        match &posts[1] {
            Post::Photoset(p) => {
                assert_eq!(p.id, "102");
                assert_eq!(p.photos.len(), 2);
                assert_eq!(p.photos[0].id, "o1");
                assert_eq!(p.photos[1].photo_urls.len(), 2);
            }
            other => panic!("expected photoset, got {:?}", other),
        }

        match &posts[2] {
            Post::Video(p) => {
                assert_eq!(p.players.len(), 2);
                assert!(p.players[1].starts_with("<video width=\"400\""));
                assert!(p.players[1].contains(r#""hdUrl":false"#));
            }
            other => panic!("expected video post, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_post_list_is_parse_error() {
        let body = r#"<tumblr version="1.0"><posts start="50" total="3"/></tumblr>"#;
        assert!(matches!(
            parse_feed_page(body.as_bytes()),
            Err(Error::FeedParse(_))
        ));
    }

    #[test]
    fn test_missing_post_list_is_parse_error() {
        let body = r#"<tumblr version="1.0"><tumblelog name="x"/></tumblr>"#;
        assert!(matches!(
            parse_feed_page(body.as_bytes()),
            Err(Error::FeedParse(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let body = b"<tumblr><posts>\xff\xfe</posts></tumblr>";
        assert!(matches!(parse_feed_page(body), Err(Error::FeedDecode(_))));
    }

    #[test]
    fn test_malformed_xml_is_decode_error() {
        let body = "<tumblr><posts><post id=\"1\"></posts></tumblr>";
        assert!(matches!(
            parse_feed_page(body.as_bytes()),
            Err(Error::FeedDecode(_))
        ));
    }

    #[test]
    fn test_empty_photoset_falls_back_to_plain() {
        let body = r#"<tumblr><posts><post id="7"><photo-url>https://h/a/p.jpg</photo-url><photoset></photoset></post></posts></tumblr>"#;
        let posts = parse_feed_page(body.as_bytes()).unwrap();
        assert!(matches!(&posts[0], Post::Plain(p) if p.photo_urls == vec!["https://h/a/p.jpg"]));
    }
}
