//! Raw feed page and per-post dumps, kept next to the media for inspection.

use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::Result;
use crate::fs::naming::sanitize_path_component;
use crate::fs::paths::{post_dump_path, response_dump_path};
use crate::media::{MediaKind, Post};

/// Re-indent an XML document.
pub fn pretty_xml(body: &str) -> Result<String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Write one feed page, pretty-printed when it parses and verbatim otherwise.
pub fn dump_response(
    site_dir: &Path,
    site: &str,
    kind: MediaKind,
    start: u64,
    num: u32,
    body: &[u8],
) -> Result<PathBuf> {
    let path = response_dump_path(site_dir, site, kind, start, num);

    let pretty = std::str::from_utf8(body)
        .ok()
        .and_then(|text| pretty_xml(text).ok());
    match pretty {
        Some(text) => std::fs::write(&path, text)?,
        None => std::fs::write(&path, body)?,
    }

    Ok(path)
}

/// Write one post as pretty JSON.
pub fn dump_post(site_dir: &Path, site: &str, post: &Post) -> Result<PathBuf> {
    let id = sanitize_path_component(post.id()).unwrap_or_else(|_| "unknown".to_string());
    let path = post_dump_path(site_dir, site, &id);
    std::fs::write(&path, serde_json::to_string_pretty(post)?)?;
    Ok(path)
}
