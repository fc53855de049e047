//! Configuration validation logic.

use std::sync::OnceLock;

use crate::config::loader::Config;
use crate::error::{Error, Result};
use regex::Regex;

/// Maximum site name length.
const MAX_SITE_LENGTH: usize = 64;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_sites(&config.sites.names)?;
    validate_options(config)?;
    validate_network(config)?;

    Ok(())
}

/// Validate site names.
pub fn validate_sites<S: AsRef<str>, I: IntoIterator<Item = S>>(sites: I) -> Result<()> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let site_pattern = PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());

    let sites: Vec<_> = sites.into_iter().collect();

    if sites.is_empty() {
        return Err(Error::MissingConfig(
            "sites (at least one blog name required)".to_string(),
        ));
    }

    for site in sites {
        let site = site.as_ref();

        if site.len() > MAX_SITE_LENGTH {
            return Err(Error::ConfigValidation {
                field: "sites".to_string(),
                message: format!(
                    "Site '{}' is too long (maximum {} characters)",
                    site, MAX_SITE_LENGTH
                ),
            });
        }

        if !site_pattern.is_match(site) || site.contains("..") {
            return Err(Error::ConfigValidation {
                field: "sites".to_string(),
                message: format!(
                    "Site '{}' contains invalid characters. Only alphanumeric, dots, hyphens, and underscores allowed.",
                    site
                ),
            });
        }
    }

    Ok(())
}

fn positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_options(config: &Config) -> Result<()> {
    let options = &config.options;
    positive("page_size", options.page_size as u64)?;
    positive("retries", options.retries as u64)?;
    positive("timeout_secs", options.timeout_secs)?;
    positive("workers", options.workers as u64)?;
    positive("queue_capacity", options.queue_capacity as u64)?;
    positive("page_error_limit", options.page_error_limit as u64)?;

    if options.media_kinds.is_empty() {
        return Err(Error::ConfigValidation {
            field: "media_kinds".to_string(),
            message: "at least one media kind required".to_string(),
        });
    }

    Ok(())
}

fn validate_network(config: &Config) -> Result<()> {
    let network = &config.network;

    if !network.feed_url_template.contains("{site}") {
        return Err(Error::ConfigValidation {
            field: "feed_url_template".to_string(),
            message: "must contain the {site} placeholder".to_string(),
        });
    }

    url::Url::parse(&network.feed_url_template.replace("{site}", "example"))?;
    url::Url::parse(&network.video_base_url)?;

    Ok(())
}
