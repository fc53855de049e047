//! Tumblr API module.
//!
//! This module provides the HTTP client used for feed pages and asset downloads.

pub mod client;

pub use client::TumblrClient;
