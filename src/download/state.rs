//! Download statistics tracking.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::download::executor::Outcome;

/// Per-outcome task counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadCounts {
    pub saved: u64,
    pub skipped: u64,
    pub failed: u64,
    pub unresolved: u64,
}

impl DownloadCounts {
    /// Total tasks processed.
    pub fn total(&self) -> u64 {
        self.saved + self.skipped + self.failed + self.unresolved
    }

    /// Counts accumulated since an earlier snapshot.
    pub fn since(&self, earlier: &DownloadCounts) -> DownloadCounts {
        DownloadCounts {
            saved: self.saved.saturating_sub(earlier.saved),
            skipped: self.skipped.saturating_sub(earlier.skipped),
            failed: self.failed.saturating_sub(earlier.failed),
            unresolved: self.unresolved.saturating_sub(earlier.unresolved),
        }
    }

    fn add(&mut self, other: &DownloadCounts) {
        self.saved += other.saved;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.unresolved += other.unresolved;
    }
}

/// Counters updated by every worker of a pool.
#[derive(Debug, Default)]
pub struct PoolCounters {
    saved: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    unresolved: AtomicU64,
}

impl PoolCounters {
    /// Record the outcome of one executed task.
    pub fn record(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Saved { .. } => &self.saved,
            Outcome::Skipped { .. } => &self.skipped,
            Outcome::Failed { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task whose post yielded no URL.
    pub fn record_unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DownloadCounts {
        DownloadCounts {
            saved: self.saved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
        }
    }
}

/// How a site's processing ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteStatus {
    #[default]
    Completed,
    /// The feed answered 404.
    NotFound,
    /// The feed could not be fetched at all.
    Failed,
}

/// Per-site report.
#[derive(Debug, Default, Clone)]
pub struct SiteReport {
    pub site: String,
    pub status: SiteStatus,
    pub pages: u64,
    pub skipped_pages: u64,
    pub tasks: u64,
    pub counts: DownloadCounts,
}

impl SiteReport {
    pub fn new(site: &str) -> Self {
        Self {
            site: site.to_string(),
            ..Default::default()
        }
    }
}

/// Statistics across all sites.
#[derive(Debug, Default, Clone)]
pub struct GlobalReport {
    pub sites_processed: u64,
    pub sites_not_found: u64,
    pub sites_failed: u64,
    pub tasks: u64,
    pub counts: DownloadCounts,
}

impl GlobalReport {
    /// Add a site's report.
    pub fn add_site(&mut self, report: &SiteReport) {
        self.sites_processed += 1;
        match report.status {
            SiteStatus::Completed => {}
            SiteStatus::NotFound => self.sites_not_found += 1,
            SiteStatus::Failed => self.sites_failed += 1,
        }
        self.tasks += report.tasks;
        self.counts.add(&report.counts);
    }

    /// Whether every processed site failed to fetch.
    pub fn all_sites_failed(&self) -> bool {
        self.sites_processed > 0 && self.sites_failed == self.sites_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_counters_snapshot_and_delta() {
        let counters = PoolCounters::default();
        counters.record(&Outcome::Saved {
            path: PathBuf::from("a.jpg"),
            retries: 0,
        });
        let before = counters.snapshot();

        counters.record(&Outcome::Skipped {
            path: PathBuf::from("b.jpg"),
        });
        counters.record(&Outcome::Failed {
            retries: 5,
            reason: "timeout".into(),
        });
        counters.record_unresolved();

        let delta = counters.snapshot().since(&before);
        assert_eq!(
            delta,
            DownloadCounts {
                saved: 0,
                skipped: 1,
                failed: 1,
                unresolved: 1
            }
        );
        assert_eq!(counters.snapshot().total(), 4);
    }

    #[test]
    fn test_global_report_accumulates() {
        let mut global = GlobalReport::default();
        let mut ok = SiteReport::new("a");
        ok.tasks = 3;
        ok.counts.saved = 3;
        let mut missing = SiteReport::new("b");
        missing.status = SiteStatus::NotFound;

        global.add_site(&ok);
        global.add_site(&missing);

        assert_eq!(global.sites_processed, 2);
        assert_eq!(global.sites_not_found, 1);
        assert_eq!(global.counts.saved, 3);
        assert!(!global.all_sites_failed());
    }
}
