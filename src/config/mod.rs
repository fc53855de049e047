//! Configuration module for tumblr-ripper.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Site list and proxy file parsing
//! - Configuration validation

pub mod loader;
pub mod proxies;
pub mod sites;
pub mod validation;

pub use loader::{Config, NetworkConfig, OptionsConfig, SitesConfig};
pub use proxies::ProxyMap;
pub use sites::{load_sites_file, parse_sites};
pub use validation::{validate_config, validate_sites};
