//! Filename derivation and correction.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Extension forced onto every video filename.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Last path segment of a URL, without its query string.
pub fn filename_from_url(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.split('?').next().unwrap_or(last).to_string()
}

/// Second-to-last path segment of a URL, if any.
fn parent_segment(url: &str) -> Option<&str> {
    let path = url.split('?').next().unwrap_or(url);
    let mut segments = path.rsplit('/');
    segments.next()?;
    segments.next().filter(|s| !s.is_empty())
}

/// Canonical filename of a video.
///
/// Names not carrying the asset prefix are prefixed with the URL's parent segment
/// (the video ID on `video_file` links), and the video extension is always appended.
pub fn video_filename(url: &str, asset_prefix: &str) -> String {
    let mut name = filename_from_url(url);
    if !name.starts_with(asset_prefix) {
        if let Some(parent) = parent_segment(url) {
            name = format!("{}_{}", parent, name);
        }
    }
    format!("{}.{}", name, VIDEO_EXTENSION)
}

/// Split a filename into stem and extension (without dot).
///
/// Leading dots do not start an extension, matching how `.hidden` files behave.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 && !filename[..pos].chars().all(|c| c == '.') => {
            (&filename[..pos], &filename[pos + 1..])
        }
        _ => (filename, ""),
    }
}

/// Replace the extension of a filename.
pub fn replace_extension(filename: &str, extension: &str) -> String {
    let (stem, _) = split_extension(filename);
    format!("{}.{}", stem, extension)
}

/// Extract `filename="..."` from a `Content-Disposition` header value.
pub fn content_disposition_filename(value: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r#"filename="(.+)""#).unwrap());

    pattern
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a path component (site folder name) with less strict validation.
///
/// Separators are replaced rather than rejected; traversal is still refused.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}
