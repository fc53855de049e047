//! Tumblr Ripper - bulk photo and video downloader for Tumblr blogs
//!
//! This library walks the paginated XML feed of each blog, turns every post into
//! download tasks, and runs them through a bounded pool of workers.
//!
//! # Features
//!
//! - Photo, photoset and video posts
//! - HD video renditions when the player advertises one
//! - File extensions corrected from the served content type
//! - Files already on disk are never fetched again
//! - Fixed retry ceiling per asset
//! - Optional raw page and per-post dumps
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tumblr_ripper::{Config, Scheduler, TumblrClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let client = TumblrClient::new(&config, None)?;
//!     let scheduler = Scheduler::new(config, client);
//!
//!     let report = scheduler.run(&["staff".to_string()], |_| {}).await;
//!     scheduler.shutdown().await;
//!     println!("{} saved", report.counts.saved);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::TumblrClient;
pub use config::Config;
pub use download::{GlobalReport, Scheduler, SiteReport};
pub use error::{Error, Result};
pub use media::{MediaKind, MediaResolver, Post};
