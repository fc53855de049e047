//! Image MIME type to file extension mapping.

use crate::error::{Error, Result};
use crate::fs::naming::{replace_extension, split_extension};

/// Image subtypes and their accepted extensions; the first extension is canonical.
const IMAGE_EXTENSIONS: &[(&str, &[&str])] = &[
    ("bmp", &["bmp"]),
    ("gif", &["gif"]),
    ("vnd.microsoft.icon", &["ico"]),
    ("jpeg", &["jpg", "jpeg"]),
    ("png", &["png"]),
    ("svg+xml", &["svg"]),
    ("tiff", &["tif", "tiff"]),
    ("webp", &["webp"]),
];

/// Accepted extensions for an image subtype (`jpeg`, `png`, ...).
pub fn image_extensions(subtype: &str) -> Option<&'static [&'static str]> {
    IMAGE_EXTENSIONS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(subtype))
        .map(|(_, exts)| *exts)
}

/// Image subtype of a `Content-Type` value, parameters removed.
///
/// Returns `None` for non-image content types.
pub fn image_subtype(content_type: &str) -> Option<&str> {
    let essence = content_type.split(';').next()?.trim();
    let (top, sub) = essence.split_once('/')?;
    if !top.eq_ignore_ascii_case("image") || sub.is_empty() {
        return None;
    }
    Some(sub)
}

/// Bring a filename's extension in line with the response's image content type.
///
/// Returns `Ok(None)` when nothing needs to change (non-image type, or the current
/// extension is already accepted for the subtype), `Ok(Some(name))` with the corrected
/// name otherwise, and [`Error::UnknownMime`] for an image subtype missing from the table.
pub fn correct_extension(filename: &str, content_type: &str) -> Result<Option<String>> {
    let Some(subtype) = image_subtype(content_type) else {
        return Ok(None);
    };

    let extensions =
        image_extensions(subtype).ok_or_else(|| Error::UnknownMime(subtype.to_string()))?;

    let (_, current) = split_extension(filename);
    if extensions.iter().any(|ext| ext.eq_ignore_ascii_case(current)) {
        tracing::info!("ext .{} matches mime image/{}", current, subtype);
        return Ok(None);
    }

    tracing::info!("ext changes from .{} to .{}", current, extensions[0]);
    Ok(Some(replace_extension(filename, extensions[0])))
}
