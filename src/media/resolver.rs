//! Source URL resolution for feed posts.

use regex::Regex;

use crate::error::{Error, Result};
use crate::fs::naming::filename_from_url;
use crate::media::kind::MediaKind;
use crate::media::post::{PlainPost, Post, VideoPost};

/// Index of the embed blob used for extraction (the first player is a bare iframe).
const VIDEO_PLAYER_INDEX: usize = 1;

/// A URL picked from a post, with the filename it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub url: String,
    pub inferred_filename: String,
}

impl ResolvedAsset {
    fn new(url: String) -> Self {
        let inferred_filename = filename_from_url(&url);
        Self {
            url,
            inferred_filename,
        }
    }
}

/// One way of pulling a video URL out of player embed markup.
pub trait UrlRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the extracted URL, or `None` when the rule does not apply.
    fn extract(&self, player: &str) -> Option<String>;
}

/// Picks the HD rendition from the player's `data-crt-options` JSON.
pub struct HdUrlRule {
    pattern: Regex,
}

impl HdUrlRule {
    pub fn new() -> Self {
        Self {
            // Greedy and anchored to the first line, so the last hdUrl on that line wins.
            pattern: Regex::new(r#"^.*"hdUrl":("([^\s,]*)"|false),"#).unwrap(),
        }
    }
}

impl Default for HdUrlRule {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlRule for HdUrlRule {
    fn name(&self) -> &'static str {
        "hd"
    }

    fn extract(&self, player: &str) -> Option<String> {
        let captures = self.pattern.captures(player)?;
        if captures.get(1)?.as_str() == "false" {
            return None;
        }
        let url = captures.get(2)?.as_str().replace('\\', "");
        (!url.is_empty()).then_some(url)
    }
}

/// Picks the default rendition from the last `src="..."` attribute followed by a space.
pub struct DefaultSrcRule {
    pattern: Regex,
}

impl DefaultSrcRule {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r#"(?s)^.*src="(\S*)" "#).unwrap(),
        }
    }
}

impl Default for DefaultSrcRule {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlRule for DefaultSrcRule {
    fn name(&self) -> &'static str {
        "default"
    }

    fn extract(&self, player: &str) -> Option<String> {
        self.pattern
            .captures(player)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Resolves the single source URL of a post.
///
/// Video rules are tried in order and the first match wins; more renditions can be
/// supported by pushing rules with [`MediaResolver::with_rule`].
pub struct MediaResolver {
    rules: Vec<Box<dyn UrlRule>>,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self {
            rules: vec![Box::new(HdUrlRule::new()), Box::new(DefaultSrcRule::new())],
        }
    }
}

impl MediaResolver {
    /// Create a resolver with the built-in HD and default rendition rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, tried after the existing ones.
    pub fn with_rule(mut self, rule: Box<dyn UrlRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolve the asset URL of `post` for the given media kind.
    ///
    /// Any shape mismatch collapses to [`Error::Resolution`]; photosets must be
    /// flattened before resolution.
    pub fn resolve(&self, kind: MediaKind, post: &Post) -> Result<ResolvedAsset> {
        let url = match (kind, post) {
            (MediaKind::Photo, Post::Plain(photo)) => resolve_photo(photo),
            (MediaKind::Video, Post::Video(video)) => self.resolve_video(video),
            _ => None,
        };

        url.map(ResolvedAsset::new).ok_or_else(|| Error::Resolution {
            kind: kind.to_string(),
            post_id: post.id().to_string(),
        })
    }

    fn resolve_video(&self, video: &VideoPost) -> Option<String> {
        let player = video.players.get(VIDEO_PLAYER_INDEX)?;
        self.rules.iter().find_map(|rule| {
            let url = rule.extract(player)?;
            tracing::debug!("Video rule '{}' matched {}", rule.name(), url);
            Some(url)
        })
    }
}

fn resolve_photo(photo: &PlainPost) -> Option<String> {
    photo
        .photo_urls
        .first()
        .filter(|url| !url.is_empty())
        .cloned()
}
