//! Feed pagination.

use std::path::Path;

use crate::api::TumblrClient;
use crate::config::OptionsConfig;
use crate::download::pool::TaskSink;
use crate::download::task::{flatten_post, PageCursor};
use crate::error::Error;
use crate::fs::{dump_post, dump_response};
use crate::media::{parse_feed_page, MediaKind};
use crate::output::create_spinner;

/// Why a walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEnd {
    /// The feed ran out of posts.
    Exhausted,
    /// The feed answered 404.
    SiteNotFound,
    /// A page could not be fetched at all, or the task queue closed.
    FetchFailed(String),
    /// Too many undecodable pages in a row.
    TooManyBadPages,
}

/// Totals of one (site, kind) walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: u64,
    pub skipped_pages: u64,
    pub tasks: u64,
    pub end: WalkEnd,
}

/// Walks one site's feed page by page, handing tasks to a sink.
pub struct FeedWalker<'a> {
    client: &'a TumblrClient,
    options: &'a OptionsConfig,
}

impl<'a> FeedWalker<'a> {
    pub fn new(client: &'a TumblrClient, options: &'a OptionsConfig) -> Self {
        Self { client, options }
    }

    /// Walk the `kind` feed of `site` until it is exhausted.
    pub async fn walk(
        &self,
        site: &str,
        kind: MediaKind,
        site_dir: &Path,
        sink: &dyn TaskSink,
    ) -> WalkSummary {
        let mut cursor = PageCursor::new(site, kind, self.options.start, self.options.page_size);
        let mut summary = WalkSummary {
            pages: 0,
            skipped_pages: 0,
            tasks: 0,
            end: WalkEnd::Exhausted,
        };
        let mut bad_pages_in_row = 0u32;

        let spinner = self
            .options
            .show_progress
            .then(|| create_spinner(&format!("Walking {} {}", site, kind.plural())));

        loop {
            let url = self
                .client
                .feed_url(site, kind, cursor.page_size, cursor.offset);
            if let Some(ref sp) = spinner {
                sp.set_message(format!(
                    "{} {}: offset {} ({} queued)",
                    site,
                    kind.plural(),
                    cursor.offset,
                    summary.tasks
                ));
            }

            let fetched = self
                .client
                .get_feed_page(site, kind, cursor.page_size, cursor.offset)
                .await;

            let body = match fetched {
                Ok(body) => body,
                Err(Error::SiteNotFound(_)) => {
                    tracing::info!("Site {} does not exist", site);
                    summary.end = WalkEnd::SiteNotFound;
                    break;
                }
                Err(e @ Error::HttpStatus { .. }) => {
                    tracing::warn!("Skipping page {}: {}", url, e);
                    summary.skipped_pages += 1;
                    bad_pages_in_row += 1;
                    if bad_pages_in_row >= self.options.page_error_limit {
                        summary.end = WalkEnd::TooManyBadPages;
                        break;
                    }
                    cursor.advance();
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Cannot fetch {}: {}", url, e);
                    summary.end = WalkEnd::FetchFailed(e.to_string());
                    break;
                }
            };

            if self.options.dump_responses {
                if let Err(e) = dump_response(
                    site_dir,
                    site,
                    kind,
                    cursor.offset,
                    cursor.page_size,
                    &body,
                ) {
                    tracing::warn!("Cannot write page dump for {}: {}", url, e);
                }
            }

            let posts = match parse_feed_page(&body) {
                Ok(posts) => posts,
                Err(Error::FeedParse(reason)) => {
                    tracing::debug!("No more posts at {}: {}", url, reason);
                    break;
                }
                Err(e) => {
                    tracing::info!("Cannot decode response data from URL {}: {}", url, e);
                    summary.skipped_pages += 1;
                    bad_pages_in_row += 1;
                    if bad_pages_in_row >= self.options.page_error_limit {
                        summary.end = WalkEnd::TooManyBadPages;
                        break;
                    }
                    cursor.advance();
                    continue;
                }
            };

            bad_pages_in_row = 0;
            summary.pages += 1;
            tracing::debug!("{} posts at {}", posts.len(), url);

            for post in posts {
                if self.options.dump_posts {
                    if let Err(e) = dump_post(site_dir, site, &post) {
                        tracing::warn!("Cannot write post dump {}: {}", post.id(), e);
                    }
                }

                for task in flatten_post(kind, post, site, site_dir) {
                    if let Err(e) = sink.submit(task).await {
                        summary.end = WalkEnd::FetchFailed(e.to_string());
                        return finish(summary, spinner);
                    }
                    summary.tasks += 1;
                }
            }

            cursor.advance();
        }

        finish(summary, spinner)
    }
}

fn finish(summary: WalkSummary, spinner: Option<indicatif::ProgressBar>) -> WalkSummary {
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    summary
}
