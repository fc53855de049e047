//! Site list parsing.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Split raw text into site names.
///
/// Names may be separated by commas, spaces, tabs, carriage returns or newlines.
/// Empty entries and repeated names are dropped; first-seen order is kept.
pub fn parse_sites(raw: &str) -> Vec<String> {
    let mut sites: Vec<String> = Vec::new();

    for site in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let site = site.trim();
        if !site.is_empty() && !sites.iter().any(|s| s == site) {
            sites.push(site.to_string());
        }
    }

    sites
}

/// Load site names from a file.
pub fn load_sites_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::MissingConfig(format!(
                "sites (no site given and {} not found)",
                path.display()
            ))
        } else {
            Error::Io(e)
        }
    })?;

    Ok(parse_sites(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sites_mixed_separators() {
        let raw = "  site1,site2\tsite3\r\nsite4 site5,,\n\nsite1 ";
        assert_eq!(
            parse_sites(raw),
            vec!["site1", "site2", "site3", "site4", "site5"]
        );
    }

    #[test]
    fn test_parse_sites_empty() {
        assert!(parse_sites(" ,\n\t").is_empty());
    }

    #[test]
    fn test_load_sites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.txt");
        std::fs::write(&path, "alpha,beta\ngamma").unwrap();
        assert_eq!(load_sites_file(&path).unwrap(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_load_sites_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sites_file(&dir.path().join("sites.txt")).unwrap_err();
        assert!(matches!(err, Error::MissingConfig(_)));
    }
}
