//! Fixed-size download worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::download::executor::DownloadExecutor;
use crate::download::state::{DownloadCounts, PoolCounters};
use crate::download::task::DownloadTask;
use crate::error::{Error, Result};
use crate::media::MediaResolver;

/// Destination for tasks produced by a feed walk.
#[async_trait]
pub trait TaskSink: Send + Sync {
    /// Hand one task over; may wait while the queue is full.
    async fn submit(&self, task: DownloadTask) -> Result<()>;
}

/// Counts tasks that were submitted but not finished yet.
#[derive(Debug, Default)]
pub struct WaitGroup {
    pending: AtomicUsize,
    notify: Notify,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    pub fn done(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until every added task is done.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks a task done when dropped, so a panicking worker cannot stall a drain-wait.
struct DoneGuard<'a>(&'a WaitGroup);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}

/// N workers sharing one bounded queue.
pub struct WorkerPool {
    sender: mpsc::Sender<DownloadTask>,
    wait_group: Arc<WaitGroup>,
    counters: Arc<PoolCounters>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers on the current runtime.
    pub fn new(
        size: usize,
        capacity: usize,
        resolver: Arc<MediaResolver>,
        executor: Arc<DownloadExecutor>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let wait_group = Arc::new(WaitGroup::new());
        let counters = Arc::new(PoolCounters::default());

        let workers = (0..size.max(1))
            .map(|id| {
                let worker = Worker {
                    id,
                    receiver: Arc::clone(&receiver),
                    wait_group: Arc::clone(&wait_group),
                    counters: Arc::clone(&counters),
                    resolver: Arc::clone(&resolver),
                    executor: Arc::clone(&executor),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        Self {
            sender,
            wait_group,
            counters,
            workers,
        }
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Tasks enqueued or running.
    pub fn pending(&self) -> usize {
        self.wait_group.pending()
    }

    /// Wait until every task submitted so far has been processed.
    pub async fn wait_idle(&self) {
        self.wait_group.wait().await;
    }

    /// Totals since the pool started.
    pub fn counts(&self) -> DownloadCounts {
        self.counters.snapshot()
    }

    /// Close the queue and wait for the workers to finish what is left.
    pub async fn shutdown(self) {
        drop(self.sender);
        for handle in self.workers {
            if let Err(e) = handle.await {
                tracing::warn!("Download worker ended abnormally: {}", e);
            }
        }
    }
}

#[async_trait]
impl TaskSink for WorkerPool {
    async fn submit(&self, task: DownloadTask) -> Result<()> {
        self.wait_group.add();
        if self.sender.send(task).await.is_err() {
            self.wait_group.done();
            return Err(Error::Download("download queue is closed".into()));
        }
        Ok(())
    }
}

struct Worker {
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<DownloadTask>>>,
    wait_group: Arc<WaitGroup>,
    counters: Arc<PoolCounters>,
    resolver: Arc<MediaResolver>,
    executor: Arc<DownloadExecutor>,
}

impl Worker {
    async fn run(self) {
        loop {
            let task = { self.receiver.lock().await.recv().await };
            let Some(task) = task else {
                tracing::debug!("Worker {} stopping: queue closed", self.id);
                break;
            };

            let _done = DoneGuard(&self.wait_group);
            self.process(task).await;
        }
    }

    async fn process(&self, task: DownloadTask) {
        match self.resolver.resolve(task.kind, &task.post) {
            Ok(asset) => {
                let outcome = self
                    .executor
                    .execute(task.kind, &asset.url, &task.destination)
                    .await;
                self.counters.record(&outcome);
            }
            Err(e) => {
                tracing::warn!("{} (site {}, post {:?})", e, task.site, task.post);
                self.counters.record_unresolved();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TumblrClient;
    use crate::config::Config;
    use crate::media::{MediaKind, PlainPost, Post};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pool(workers: usize, config: &Config) -> WorkerPool {
        let client = TumblrClient::new(config, None).unwrap();
        let executor = Arc::new(DownloadExecutor::new(client, config));
        WorkerPool::new(workers, 4, Arc::new(MediaResolver::new()), executor)
    }

    fn photo_task(url: &str, dest: &std::path::Path) -> DownloadTask {
        DownloadTask {
            kind: MediaKind::Photo,
            post: Post::Plain(PlainPost {
                id: "1".into(),
                photo_urls: if url.is_empty() { vec![] } else { vec![url.into()] },
            }),
            site: "staff".into(),
            destination: dest.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_wait_group_returns_immediately_when_empty() {
        let wg = WaitGroup::new();
        tokio::time::timeout(Duration::from_secs(1), wg.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_group_waits_for_done() {
        let wg = Arc::new(WaitGroup::new());
        wg.add();
        wg.add();

        let waiter = {
            let wg = Arc::clone(&wg);
            tokio::spawn(async move { wg.wait().await })
        };

        wg.done();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        wg.done();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_unresolvable_tasks_still_drain() {
        let mut config = Config::default();
        config.options.show_progress = false;
        let pool = pool(2, &config);
        let dir = tempfile::tempdir().unwrap();

        for _ in 0..10 {
            pool.submit(photo_task("", dir.path())).await.unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), pool.wait_idle())
            .await
            .unwrap();
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.counts().unresolved, 10);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_workers_download_every_task() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/jpeg")
                    .set_body_bytes(b"jpeg".to_vec())
                    .set_delay(Duration::from_millis(20)),
            )
            .expect(12)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.options.show_progress = false;
        let pool = pool(4, &config);
        assert_eq!(pool.size(), 4);
        let dir = tempfile::tempdir().unwrap();

        for i in 0..12 {
            let url = format!("{}/media/tumblr_{}.jpg", server.uri(), i);
            pool.submit(photo_task(&url, dir.path())).await.unwrap();
        }
        pool.wait_idle().await;

        let counts = pool.counts();
        assert_eq!(counts.saved, 12);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 12);
        pool.shutdown().await;
    }
}
