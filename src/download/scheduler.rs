//! Site-by-site orchestration of feed walks and downloads.

use std::sync::Arc;

use crate::api::TumblrClient;
use crate::config::Config;
use crate::download::executor::DownloadExecutor;
use crate::download::pool::WorkerPool;
use crate::download::state::{GlobalReport, SiteReport, SiteStatus};
use crate::download::walker::{FeedWalker, WalkEnd};
use crate::error::Result;
use crate::fs::{ensure_dir, get_site_folder};
use crate::media::MediaResolver;

/// Runs every site through its feeds, one site at a time, sharing one worker pool.
pub struct Scheduler {
    config: Config,
    client: TumblrClient,
    pool: WorkerPool,
}

impl Scheduler {
    /// Build the scheduler and spawn its workers.
    pub fn new(config: Config, client: TumblrClient) -> Self {
        Self::with_resolver(config, client, MediaResolver::new())
    }

    /// Same as [`Scheduler::new`] with a custom resolver.
    pub fn with_resolver(config: Config, client: TumblrClient, resolver: MediaResolver) -> Self {
        let executor = Arc::new(DownloadExecutor::new(client.clone(), &config));
        let pool = WorkerPool::new(
            config.options.workers,
            config.options.queue_capacity,
            Arc::new(resolver),
            executor,
        );
        Self {
            config,
            client,
            pool,
        }
    }

    /// Process `sites` in order; a failing site never stops the run.
    pub async fn run<F>(&self, sites: &[String], mut on_site: F) -> GlobalReport
    where
        F: FnMut(&SiteReport),
    {
        let mut global = GlobalReport::default();

        for site in sites {
            tracing::info!("Processing site: {}", site);
            let report = match self.process_site(site).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", site, e);
                    let mut report = SiteReport::new(site);
                    report.status = SiteStatus::Failed;
                    report
                }
            };
            on_site(&report);
            global.add_site(&report);
        }

        global
    }

    /// Walk every configured kind of one site, waiting for its downloads after each.
    pub async fn process_site(&self, site: &str) -> Result<SiteReport> {
        let site_dir = get_site_folder(&self.config, site)?;
        ensure_dir(&site_dir)?;

        let mut report = SiteReport::new(site);
        let before = self.pool.counts();
        let walker = FeedWalker::new(&self.client, &self.config.options);

        for &kind in &self.config.options.media_kinds {
            let summary = walker.walk(site, kind, &site_dir, &self.pool).await;
            self.pool.wait_idle().await;

            report.pages += summary.pages;
            report.skipped_pages += summary.skipped_pages;
            report.tasks += summary.tasks;

            match summary.end {
                WalkEnd::Exhausted | WalkEnd::TooManyBadPages => {
                    tracing::info!("Finish Downloading All the {} from {}", kind.plural(), site);
                }
                WalkEnd::SiteNotFound => {
                    report.status = SiteStatus::NotFound;
                    break;
                }
                WalkEnd::FetchFailed(reason) => {
                    tracing::warn!("Stopped walking {} {}: {}", site, kind.plural(), reason);
                    report.status = SiteStatus::Failed;
                    break;
                }
            }
        }

        report.counts = self.pool.counts().since(&before);
        Ok(report)
    }

    /// Close the queue and wait for the workers.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use reqwest::Client;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.options.download_directory = Some(dir.to_path_buf());
        config.options.page_size = 10;
        config.options.workers = 2;
        config.options.dump_responses = false;
        config.options.show_progress = false;
        config.options.media_kinds = vec![MediaKind::Photo, MediaKind::Video];
        config.network.feed_url_template = format!("{}/{{site}}/api/read", server.uri());
        config.network.video_base_url = format!("{}/vt", server.uri());
        config
    }

    fn client_for(config: &Config) -> TumblrClient {
        TumblrClient::from_client(Client::new(), config.network.feed_url_template.clone())
    }

    #[tokio::test]
    async fn test_runs_every_site_and_kind() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&server, dir.path());

        let photo_page = format!(
            r#"<tumblr><posts start="0" total="2">
                <post id="1"><photo-url>{0}/media/tumblr_a1.jpg</photo-url></post>
                <post id="2"><photoset>
                    <photo offset="o1"><photo-url>{0}/media/tumblr_b1.jpg</photo-url></photo>
                    <photo offset="o2"><photo-url>{0}/media/tumblr_b2.jpg</photo-url></photo>
                </photoset></post>
            </posts></tumblr>"#,
            server.uri()
        );
        let video_page = r#"<tumblr><posts start="0" total="1">
                <post id="3">
                    <video-player>small</video-player>
                    <video-player><![CDATA[<video><source src="https://www.tumblr.com/video_file/t:abc/123/tumblr_v1" type="video/mp4"></video>]]></video-player>
                </post>
            </posts></tumblr>"#;

        Mock::given(method("GET"))
            .and(path("/staff/api/read"))
            .and(query_param("type", "photo"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(photo_page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/staff/api/read"))
            .and(query_param("type", "video"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(video_page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/staff/api/read"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<tumblr/>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ghost/api/read"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vt/tumblr_v1.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "video/mp4")
                    .set_body_bytes(b"mp4".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/media/tumblr_(a1|b1)\.jpg$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/jpeg")
                    .set_body_bytes(b"jpeg".to_vec()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/media/tumblr_b2.jpg"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let scheduler = Scheduler::new(config.clone(), client_for(&config));
        let mut seen = Vec::new();
        let sites = vec!["staff".to_string(), "ghost".to_string()];
        let global = scheduler
            .run(&sites, |report| seen.push(report.site.clone()))
            .await;
        scheduler.shutdown().await;

        assert_eq!(seen, sites);
        assert_eq!(global.sites_processed, 2);
        assert_eq!(global.sites_not_found, 1);
        assert_eq!(global.tasks, 4);
        assert_eq!(global.counts.saved, 3);
        assert_eq!(global.counts.failed, 1);
        assert!(!global.all_sites_failed());

        let site_dir = dir.path().join("staff");
        assert!(site_dir.join("tumblr_a1.jpg").exists());
        assert!(site_dir.join("tumblr_b1.jpg").exists());
        assert!(!site_dir.join("tumblr_b2.jpg").exists());
        assert!(site_dir.join("tumblr_v1.mp4").exists());
    }

    #[tokio::test]
    async fn test_site_report_counts_only_that_site() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(&server, dir.path());
        config.options.media_kinds = vec![MediaKind::Photo];

        for site in ["one", "two"] {
            let page = format!(
                r#"<tumblr><posts><post id="1"><photo-url>{}/{}/tumblr_x.jpg</photo-url></post></posts></tumblr>"#,
                server.uri(),
                site
            );
            Mock::given(method("GET"))
                .and(path(format!("/{}/api/read", site)))
                .and(query_param("start", "0"))
                .respond_with(ResponseTemplate::new(200).set_body_string(page))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(format!("/{}/tumblr_x.jpg", site)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("Content-Type", "image/jpeg")
                        .set_body_bytes(b"jpeg".to_vec()),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<tumblr/>"))
            .mount(&server)
            .await;

        let scheduler = Scheduler::new(config.clone(), client_for(&config));
        let first = scheduler.process_site("one").await.unwrap();
        let second = scheduler.process_site("two").await.unwrap();
        scheduler.shutdown().await;

        assert_eq!(first.status, SiteStatus::Completed);
        assert_eq!(first.counts.saved, 1);
        assert_eq!(second.counts.saved, 1);
        assert_eq!(second.pages, 1);
    }

    #[tokio::test]
    async fn test_unreachable_feed_marks_site_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.options.download_directory = Some(dir.path().to_path_buf());
        config.options.show_progress = false;
        config.options.dump_responses = false;
        config.network.feed_url_template = "http://127.0.0.1:1/{site}/api/read".into();

        let scheduler = Scheduler::new(config.clone(), client_for(&config));
        let global = scheduler.run(&["staff".to_string()], |_| {}).await;
        scheduler.shutdown().await;

        assert_eq!(global.sites_failed, 1);
        assert!(global.all_sites_failed());
    }
}
