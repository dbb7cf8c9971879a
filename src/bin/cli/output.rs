//! Output Formatting and Display Functions
//!
//! Human output is coloured line-by-line progress followed by a summary.
//! JSON output is a single document written once the run has finished.

use owo_colors::OwoColorize;
use serde::Serialize;

use rep_filter::{FilterConfig, FilterEvent, FilterReport, KeeperSet, ParseStats, SkipReason};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the filter command reports in JSON mode
#[derive(Debug, Serialize)]
pub struct FilterSummary<'a> {
    pub manifest: &'a std::path::Path,
    pub manifest_stats: ParseStats,
    pub report: &'a FilterReport,
    pub unmatched_keys: Vec<&'a str>,
}

/// Everything the keepers command reports in JSON mode
#[derive(Debug, Serialize)]
pub struct KeepersSummary<'a> {
    pub manifest: &'a std::path::Path,
    pub manifest_stats: ParseStats,
    pub keepers: &'a KeeperSet,
}

pub fn print_header() {
    println!("{} {}", "rep-filter".bright_blue().bold(), VERSION.dimmed());
    println!();
}

pub fn display_config_summary(config: &FilterConfig, stats: &ParseStats, keepers: &KeeperSet) {
    println!("{}", "Configuration".bright_blue().bold());
    println!("  Manifest:    {}", config.manifest_path.display().cyan());
    println!("  Root:        {}", config.root.display().cyan());
    println!("  Directories: {}", config.directory_pattern.cyan());
    println!("  Patches:     {}", config.patch_pattern.cyan());
    if config.dry_run {
        println!("  Mode:        {}", "dry run (nothing will be deleted)".yellow());
    } else {
        println!("  Mode:        {}", "delete".red());
    }
    println!(
        "  Manifest:    {} records, {} lines ignored, {} directories, {} keepers",
        stats.matched,
        stats.skipped,
        keepers.len(),
        keepers.total_keepers()
    );
    println!();
}

/// Render one progress event. Skips are only shown in verbose mode.
pub fn print_event(event: &FilterEvent, verbose: bool) {
    match event {
        FilterEvent::DirectoryEntered { name } => {
            println!("{} {}", "📁 Processing".bold(), name.cyan());
        }
        FilterEvent::DirectorySkipped { name, reason } => {
            if verbose {
                let why = match reason {
                    SkipReason::NotADirectory => "not a directory",
                    SkipReason::NotInManifest => "not in manifest",
                };
                println!("{} {} ({})", "⏭  Skipping".dimmed(), name, why.dimmed());
            }
        }
        FilterEvent::Kept { path } => {
            println!("   {} {}", "✅ Keeping".green(), path.display());
        }
        FilterEvent::Deleted { path } => {
            println!("   {} {}", "🗑️  Deleted".red(), path.display());
        }
        FilterEvent::WouldDelete { path } => {
            println!("   {} {}", "[DRY RUN] Would delete".yellow(), path.display());
        }
    }
}

pub fn display_report(report: &FilterReport, keepers: &KeeperSet) {
    println!();
    println!("{}", "Summary".bright_blue().bold());
    println!("  Directories filtered: {}", report.directories.len());
    println!("  Directories skipped:  {}", report.skipped.len());
    println!("  Patches kept:         {}", report.kept_count().to_string().green());
    if report.dry_run {
        println!(
            "  Patches to delete:    {}",
            report.removed_count().to_string().yellow()
        );
    } else {
        println!(
            "  Patches deleted:      {}",
            report.removed_count().to_string().red()
        );
    }

    if report.missing_count() > 0 {
        println!(
            "  {} listed keepers were not found on disk",
            report.missing_count().to_string().yellow()
        );
    }

    let unmatched = report.unmatched_keys(keepers);
    if !unmatched.is_empty() {
        println!(
            "  {} manifest directories were not found:",
            unmatched.len().to_string().yellow()
        );
        for key in unmatched {
            println!("    - {key}");
        }
    }
}

pub fn display_keepers(keepers: &KeeperSet, stats: &ParseStats) {
    for (dir, files) in keepers.iter() {
        println!("{}", dir.cyan().bold());
        for file in files {
            println!("  {file}");
        }
    }
    println!();
    println!(
        "{} directories, {} keepers ({} of {} lines matched)",
        keepers.len(),
        keepers.total_keepers(),
        stats.matched,
        stats.lines
    );
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
