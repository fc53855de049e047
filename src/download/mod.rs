//! Download module for feed walking and media downloading.
//!
//! This module provides:
//! - Download tasks and feed cursors
//! - Feed pagination
//! - A bounded worker pool with drain-wait
//! - Retrying media downloads
//! - Per-site and global statistics

pub mod executor;
pub mod pool;
pub mod scheduler;
pub mod state;
pub mod task;
pub mod walker;

pub use executor::{DownloadExecutor, Outcome};
pub use pool::{TaskSink, WaitGroup, WorkerPool};
pub use scheduler::Scheduler;
pub use state::{DownloadCounts, GlobalReport, SiteReport, SiteStatus};
pub use task::{flatten_post, DownloadTask, PageCursor};
pub use walker::{FeedWalker, WalkEnd, WalkSummary};
