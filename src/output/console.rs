//! Console output utilities.

use console::style;

use crate::config::Config;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Tumblr Ripper                                     ║
║     Photo and video downloader for Tumblr blogs       ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(sites: &[String], config: &Config) {
    let kinds: Vec<&str> = config
        .options
        .media_kinds
        .iter()
        .map(|k| k.plural())
        .collect();

    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Sites: {}", sites.join(", "));
    println!("  Kinds: {}", kinds.join(", "));
    println!("  Directory: {}", config.download_directory().display());
    println!(
        "  Workers: {} (retries {}, timeout {}s)",
        config.options.workers, config.options.retries, config.options.timeout_secs
    );
    println!();
}
