//! Filesystem module.
//!
//! Provides:
//! - Site folder and artifact paths
//! - Filename derivation and correction
//! - Raw page and post dumps

pub mod dump;
pub mod naming;
pub mod paths;

pub use dump::{dump_post, dump_response};
pub use naming::{filename_from_url, sanitize_filename, video_filename};
pub use paths::{ensure_dir, get_site_folder};
