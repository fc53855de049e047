//! Media module for post representation, feed parsing and URL resolution.

pub mod kind;
pub mod mime;
pub mod parser;
pub mod post;
pub mod resolver;

pub use kind::MediaKind;
pub use parser::parse_feed_page;
pub use post::{PhotosetPost, PlainPost, Post, VideoPost};
pub use resolver::{DefaultSrcRule, HdUrlRule, MediaResolver, ResolvedAsset, UrlRule};
