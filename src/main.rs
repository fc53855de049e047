//! Tumblr Ripper - CLI entry point.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tumblr_ripper::{
    api::TumblrClient,
    cli::Args,
    config::{validate_config, Config, ProxyMap},
    download::Scheduler,
    error::{exit_codes, Error, Result},
    output::{
        print_banner, print_config_summary, print_error, print_global_stats, print_info,
        print_site_stats, print_summary, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::InvalidProxy(_)
                | Error::TomlParse(_)
                | Error::UrlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Download(_) => ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();
    let debug = args.debug;

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    init_logging(debug, config.options.log_directory.as_deref())?;

    config.resolve_sites()?;
    validate_config(&config)?;

    let proxies = ProxyMap::load(&config.network.proxies_file)?;
    if let Some(ref proxies) = proxies {
        for (scheme, url) in proxies.iter() {
            tracing::info!("Using {} proxy {}", scheme, url);
        }
    }

    let sites = config.sites.names.clone();
    print_config_summary(&sites, &config);

    let client = TumblrClient::new(&config, proxies.as_ref())?;
    let scheduler = Scheduler::new(config, client);

    let global = scheduler.run(&sites, print_site_stats).await;
    scheduler.shutdown().await;

    print_global_stats(&global);
    print_summary(&global);

    if global.all_sites_failed() {
        return Err(Error::Download(format!(
            "all {} site(s) failed",
            global.sites_failed
        )));
    }

    Ok(())
}

/// Install the console logger and, when a log directory is set, a dated log file.
fn init_logging(debug: bool, log_directory: Option<&Path>) -> Result<()> {
    let log_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file_layer = match log_directory {
        Some(dir) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(dir)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(())
}

fn open_log_file(dir: &Path) -> Result<File> {
    std::fs::create_dir_all(dir)?;
    let name = format!("{}.log", chrono::Local::now().format("%Y-%m-%d"));
    Ok(OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(name))?)
}
