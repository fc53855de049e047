//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_path_component;
use crate::media::MediaKind;

/// Get the folder a site's media is saved to.
pub fn get_site_folder(config: &Config, site: &str) -> Result<PathBuf> {
    let folder = sanitize_path_component(site)?;
    Ok(config.download_directory().join(folder))
}

/// Path of the raw feed page dump for one page.
pub fn response_dump_path(
    site_dir: &Path,
    site: &str,
    kind: MediaKind,
    start: u64,
    num: u32,
) -> PathBuf {
    site_dir.join(format!("{}_{}_{}_{}.response.xml", site, kind, start, num))
}

/// Path of the JSON dump for one post.
pub fn post_dump_path(site_dir: &Path, site: &str, post_id: &str) -> PathBuf {
    site_dir.join(format!("{}_post_id_{}.post.json", site, post_id))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
