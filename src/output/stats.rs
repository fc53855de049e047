//! Statistics reporting.

use console::style;

use crate::download::{GlobalReport, SiteReport, SiteStatus};

/// Print statistics for a single site.
pub fn print_site_stats(report: &SiteReport) {
    println!();
    println!(
        "{}",
        style(format!("Statistics for {}:", report.site)).bold()
    );
    match report.status {
        SiteStatus::Completed => {}
        SiteStatus::NotFound => println!("  {}", style("Site does not exist").yellow()),
        SiteStatus::Failed => println!("  {}", style("Feed could not be fetched").red()),
    }
    println!(
        "  Pages:      {} ({} skipped)",
        report.pages, report.skipped_pages
    );
    println!("  Queued:     {}", report.tasks);
    println!("  Saved:      {}", report.counts.saved);
    println!("  Skipped:    {} (already on disk)", report.counts.skipped);
    if report.counts.failed > 0 {
        println!("  Failed:     {}", style(report.counts.failed).red());
    }
    if report.counts.unresolved > 0 {
        println!("  Unresolved: {}", style(report.counts.unresolved).yellow());
    }
}

/// Print global statistics across all sites.
pub fn print_global_stats(report: &GlobalReport) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Sites processed: {}", report.sites_processed);
    if report.sites_not_found > 0 {
        println!(
            "  Sites not found: {}",
            style(report.sites_not_found).yellow()
        );
    }
    if report.sites_failed > 0 {
        println!("  Sites failed:    {}", style(report.sites_failed).red());
    }
    println!("  Queued:     {}", report.tasks);
    println!("  Saved:      {}", report.counts.saved);
    println!("  Skipped:    {} (already on disk)", report.counts.skipped);
    println!("  Failed:     {}", report.counts.failed);
    println!("  Unresolved: {}", report.counts.unresolved);
    println!("{}", style("═".repeat(50)).dim());
}

/// Print a summary line for quick viewing.
pub fn print_summary(report: &GlobalReport) {
    println!(
        "Downloaded: {} saved, {} failed ({} skipped)",
        style(report.counts.saved).green(),
        style(report.counts.failed).red(),
        style(report.counts.skipped).yellow()
    );
}
