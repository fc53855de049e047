//! Proxy configuration loading.
//!
//! The proxy file is a JSON object keyed by scheme:
//!
//! ```json
//! { "http": "socks5://127.0.0.1:1080", "https": "socks5://127.0.0.1:1080" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use reqwest::Proxy;

use crate::error::{Error, Result};

/// Proxy URLs keyed by the scheme they apply to (`http`, `https` or `all`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMap {
    entries: BTreeMap<String, String>,
}

impl ProxyMap {
    /// Parse a proxy map from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Option<BTreeMap<String, String>> = serde_json::from_str(content)
            .map_err(|e| Error::InvalidProxy(format!("illegal JSON: {}", e)))?;

        Ok(Self {
            entries: entries.unwrap_or_default(),
        })
    }

    /// Load the proxy file if it exists.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let map = Self::from_json(&content)?;
        Ok((!map.is_empty()).then_some(map))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(scheme, url)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert into `reqwest` proxies, validating every entry.
    pub fn to_proxies(&self) -> Result<Vec<Proxy>> {
        self.entries
            .iter()
            .map(|(scheme, url)| {
                let proxy = match scheme.to_lowercase().as_str() {
                    "http" => Proxy::http(url),
                    "https" => Proxy::https(url),
                    "all" => Proxy::all(url),
                    other => {
                        return Err(Error::InvalidProxy(format!(
                            "unsupported scheme '{}'",
                            other
                        )))
                    }
                };
                proxy.map_err(|e| Error::InvalidProxy(format!("{} -> {}: {}", scheme, url, e)))
            })
            .collect()
    }
}
