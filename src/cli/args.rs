//! Command-line argument definitions using clap.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{parse_sites, Config};
use crate::media::MediaKind;

/// Tumblr photo and video ripper CLI.
#[derive(Parser, Debug)]
#[command(
    name = "tumblr-ripper",
    version,
    about = "Download photos and videos from Tumblr blogs",
    long_about = "A CLI tool to download every photo and video posted on one or more Tumblr blogs.\n\n\
                  Files land in one folder per blog; files already on disk are never fetched again."
)]
pub struct Args {
    /// Blog name(s), separated by commas or spaces.
    /// Falls back to the sites file when omitted.
    #[arg(value_name = "SITES", num_args = 0..)]
    pub sites: Vec<String>,

    /// File listing blog names when none are given on the command line.
    #[arg(long = "sites-file", env = "TUMBLR_RIPPER_SITES")]
    pub sites_file: Option<PathBuf>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml", env = "TUMBLR_RIPPER_CONFIG")]
    pub config: PathBuf,

    /// Number of concurrent download workers.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Attempts per asset before giving up.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Posts requested per feed page.
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,

    /// Feed offset to start from.
    #[arg(long)]
    pub start: Option<u64>,

    /// Media kind(s) to download; repeat for several.
    #[arg(long = "kind", value_enum, action = ArgAction::Append)]
    pub kinds: Vec<KindArg>,

    /// Download videos as well as photos.
    #[arg(long)]
    pub video: bool,

    /// Write each parsed post as JSON next to the media.
    #[arg(long)]
    pub dump_posts: bool,

    /// Don't keep the raw feed pages.
    #[arg(long)]
    pub no_dump_responses: bool,

    /// JSON file mapping http/https/all to proxy URLs.
    #[arg(long, env = "TUMBLR_RIPPER_PROXIES")]
    pub proxies: Option<PathBuf>,

    /// Only log to the console.
    #[arg(long)]
    pub no_log_file: bool,

    /// Hide progress spinners and bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI media kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Photo posts and photosets.
    Photo,
    /// Video posts.
    Video,
}

impl From<KindArg> for MediaKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Photo => MediaKind::Photo,
            KindArg::Video => MediaKind::Video,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        // Positional sites replace the configured list
        let sites = parse_sites(&self.sites.join(","));
        if !sites.is_empty() {
            config.sites.names = sites;
        }

        if let Some(file) = self.sites_file {
            config.sites.file = file;
        }

        if let Some(dir) = self.download_directory {
            config.options.download_directory = Some(dir);
        }

        if let Some(workers) = self.workers {
            config.options.workers = workers;
        }

        if let Some(retries) = self.retries {
            config.options.retries = retries;
        }

        if let Some(timeout) = self.timeout {
            config.options.timeout_secs = timeout;
        }

        if let Some(page_size) = self.page_size {
            config.options.page_size = page_size;
        }

        if let Some(start) = self.start {
            config.options.start = start;
        }

        if !self.kinds.is_empty() {
            let mut kinds: Vec<MediaKind> = Vec::new();
            for kind in self.kinds.into_iter().map(MediaKind::from) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            config.options.media_kinds = kinds;
        }

        if self.video && !config.options.media_kinds.contains(&MediaKind::Video) {
            config.options.media_kinds.push(MediaKind::Video);
        }

        // Boolean flags (only override if set to non-default)
        if self.dump_posts {
            config.options.dump_posts = true;
        }

        if self.no_dump_responses {
            config.options.dump_responses = false;
        }

        if let Some(proxies) = self.proxies {
            config.network.proxies_file = proxies;
        }

        if self.no_log_file {
            config.options.log_directory = None;
        }

        if self.quiet {
            config.options.show_progress = false;
        }
    }
}
