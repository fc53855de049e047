//! Media file downloading.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::TumblrClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs::naming::{
    content_disposition_filename, filename_from_url, sanitize_filename, video_filename,
};
use crate::media::mime::correct_extension;
use crate::media::MediaKind;
use crate::output::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Final state of one download task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A file with the asset's name already exists; nothing was written.
    Skipped { path: PathBuf },
    /// The asset was written after `retries` failed attempts.
    Saved { path: PathBuf, retries: u32 },
    /// Every attempt failed, or the server refused access.
    Failed { retries: u32, reason: String },
}

/// Result of a single HTTP attempt.
#[derive(Debug)]
enum Attempt {
    Saved(PathBuf),
    Exists(PathBuf),
    /// Worth another try (timeouts, connection errors, unknown MIME types, 5xx).
    Transient(Error),
    /// Retrying cannot help.
    Terminal(Error),
}

/// Downloads resolved asset URLs into a site folder.
#[derive(Debug, Clone)]
pub struct DownloadExecutor {
    client: TumblrClient,
    retries: u32,
    video_base_url: String,
    asset_prefix: String,
    show_progress: bool,
}

impl DownloadExecutor {
    pub fn new(client: TumblrClient, config: &Config) -> Self {
        Self {
            client,
            retries: config.options.retries,
            video_base_url: config.network.video_base_url.clone(),
            asset_prefix: config.network.asset_prefix.clone(),
            show_progress: config.options.show_progress,
        }
    }

    /// Download `url` into `target_dir`, correcting the filename from response headers.
    pub async fn execute(&self, kind: MediaKind, url: &str, target_dir: &Path) -> Outcome {
        let (url, filename) = self.canonical_target(kind, url);

        if filename.is_empty() {
            tracing::warn!("Failed to retrieve {} from {}: no filename in URL", kind, url);
            return Outcome::Failed {
                retries: 0,
                reason: format!("no filename in {}", url),
            };
        }

        let initial_path = target_dir.join(&filename);
        if initial_path.is_file() {
            tracing::debug!("Skipping existing file: {}", initial_path.display());
            return Outcome::Skipped { path: initial_path };
        }

        tracing::info!("Downloading {}", url);

        let mut partials: Vec<PathBuf> = Vec::new();
        let mut failures = 0u32;
        let mut last_error = String::from("no attempt made");

        while failures < self.retries {
            match self.attempt(&url, target_dir, &filename, &mut partials).await {
                Attempt::Saved(path) => {
                    partials.retain(|p| p != &path);
                    remove_partials(&partials).await;
                    tracing::info!("Saved {}", path.display());
                    return Outcome::Saved {
                        path,
                        retries: failures,
                    };
                }
                Attempt::Exists(path) => {
                    remove_partials(&partials).await;
                    tracing::debug!("Skipping existing file: {}", path.display());
                    return Outcome::Skipped { path };
                }
                Attempt::Transient(e) => {
                    failures += 1;
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        failures,
                        self.retries,
                        url,
                        e
                    );
                    last_error = e.to_string();
                }
                Attempt::Terminal(e) => {
                    failures += 1;
                    last_error = e.to_string();
                    break;
                }
            }
        }

        remove_partials(&partials).await;
        tracing::warn!("Failed to retrieve {} from {}: {}", kind, url, last_error);
        Outcome::Failed {
            retries: failures,
            reason: last_error,
        }
    }

    /// Fetch URL and initial filename for a resolved asset.
    ///
    /// Videos are always fetched from the canonical video host under their canonical name.
    fn canonical_target(&self, kind: MediaKind, url: &str) -> (String, String) {
        match kind {
            MediaKind::Photo => (url.to_string(), filename_from_url(url)),
            MediaKind::Video => {
                let name = video_filename(url, &self.asset_prefix);
                let url = format!("{}/{}", self.video_base_url.trim_end_matches('/'), name);
                (url, name)
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        target_dir: &Path,
        initial_name: &str,
        partials: &mut Vec<PathBuf>,
    ) -> Attempt {
        let response = match self.client.get_file(url).await {
            Ok(response) => response,
            Err(e) => return Attempt::Transient(e),
        };

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            tracing::info!("Access Denied when retrieve {}", url);
            return Attempt::Terminal(Error::AccessDenied(url.to_string()));
        }
        if !status.is_success() {
            return Attempt::Transient(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut filename = initial_name.to_string();

        if let Some(name) = header_str(&response, CONTENT_DISPOSITION.as_str())
            .and_then(content_disposition_filename)
        {
            match sanitize_filename(&name) {
                Ok(name) => {
                    tracing::info!("filename changes from {} to {}", filename, name);
                    filename = name;
                }
                Err(e) => tracing::warn!("Ignoring Content-Disposition filename: {}", e),
            }
        }

        if let Some(content_type) = header_str(&response, CONTENT_TYPE.as_str()) {
            match correct_extension(&filename, content_type) {
                Ok(Some(corrected)) => filename = corrected,
                Ok(None) => {}
                Err(e) => return Attempt::Transient(e),
            }
        }

        let path = target_dir.join(&filename);

        // A file left by an earlier attempt of this task is overwritten.
        if path.is_file() && !partials.contains(&path) {
            return Attempt::Exists(path);
        }

        if !partials.contains(&path) {
            partials.push(path.clone());
        }
        match self.write_body(response, &path).await {
            Ok(()) => Attempt::Saved(path),
            Err(e) => Attempt::Transient(e),
        }
    }

    /// Stream a response body to disk.
    async fn write_body(&self, response: Response, output_path: &Path) -> Result<()> {
        let content_length = response.content_length();
        let progress = (self.show_progress
            && content_length.map(|l| l > PROGRESS_THRESHOLD).unwrap_or(false))
        .then(|| {
            let name = output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            create_download_bar(content_length.unwrap_or(0), &name)
        });

        let mut file = File::create(output_path).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(())
    }
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Best-effort removal of files left by failed attempts.
async fn remove_partials(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!("Removed partial file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}
