//! Configuration structures and loading logic.

use crate::config::sites::load_sites_file;
use crate::error::{Error, Result};
use crate::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sites: SitesConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Blog targeting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    /// Blog names to download from, in processing order.
    #[serde(default)]
    pub names: Vec<String>,

    /// File listing blog names, used when no name is given directly.
    #[serde(default = "default_sites_file")]
    pub file: PathBuf,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            file: default_sites_file(),
        }
    }
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads (one folder per site below it).
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Posts requested per feed page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Offset of the first page.
    #[serde(default)]
    pub start: u64,

    /// Attempts per asset before giving up.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Timeout applied to every single HTTP call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of concurrent download workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum number of queued tasks before the feed walker waits.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Feed types walked for every site.
    #[serde(default = "default_media_kinds")]
    pub media_kinds: Vec<MediaKind>,

    /// Write every post as a separate JSON file next to the media.
    #[serde(default)]
    pub dump_posts: bool,

    /// Write every feed page as pretty-printed XML next to the media.
    #[serde(default = "default_true")]
    pub dump_responses: bool,

    /// Consecutive undecodable pages tolerated before a site is abandoned.
    #[serde(default = "default_page_error_limit")]
    pub page_error_limit: u32,

    /// Whether to show spinners and progress bars.
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Directory for dated log files; `None` disables the file sink.
    #[serde(default = "default_log_directory")]
    pub log_directory: Option<PathBuf>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            page_size: default_page_size(),
            start: 0,
            retries: default_retries(),
            timeout_secs: default_timeout_secs(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            media_kinds: default_media_kinds(),
            dump_posts: false,
            dump_responses: true,
            page_error_limit: default_page_error_limit(),
            show_progress: true,
            log_directory: default_log_directory(),
        }
    }
}

/// Remote endpoints and client identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Feed endpoint; `{site}` is replaced by the blog name.
    #[serde(default = "default_feed_url_template")]
    pub feed_url_template: String,

    /// Host serving canonical video files.
    #[serde(default = "default_video_base_url")]
    pub video_base_url: String,

    /// Prefix carried by canonical asset names.
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// JSON file mapping schemes to proxy URLs.
    #[serde(default = "default_proxies_file")]
    pub proxies_file: PathBuf,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            feed_url_template: default_feed_url_template(),
            video_base_url: default_video_base_url(),
            asset_prefix: default_asset_prefix(),
            user_agent: default_user_agent(),
            proxies_file: default_proxies_file(),
        }
    }
}

fn default_sites_file() -> PathBuf {
    PathBuf::from("sites.txt")
}

fn default_page_size() -> u32 {
    50
}

fn default_retries() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_workers() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    256
}

fn default_media_kinds() -> Vec<MediaKind> {
    vec![MediaKind::Photo]
}

fn default_page_error_limit() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_log_directory() -> Option<PathBuf> {
    Some(PathBuf::from("log"))
}

fn default_feed_url_template() -> String {
    "https://{site}.tumblr.com/api/read".to_string()
}

fn default_video_base_url() -> String {
    "https://vt.tumblr.com".to_string()
}

fn default_asset_prefix() -> String {
    "tumblr".to_string()
}

fn default_user_agent() -> String {
    concat!("tumblr-ripper/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_proxies_file() -> PathBuf {
    PathBuf::from("proxies.json")
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Per-call HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.options.timeout_secs)
    }

    /// Fill `sites.names` from the sites file when no site was configured.
    pub fn resolve_sites(&mut self) -> Result<()> {
        if self.sites.names.is_empty() {
            self.sites.names = load_sites_file(&self.sites.file)?;
        }
        Ok(())
    }
}
