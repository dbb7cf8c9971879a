//! Command Execution Logic
//!
//! Each subcommand resolves its configuration through the config layer,
//! calls into the library and hands the results to the output module.

use crate::cli::args::*;
use crate::cli::config_layer::{build_configuration, FilterOverrides, FromCliArgs};
use crate::cli::output::*;
use owo_colors::OwoColorize;
use tracing::{debug, info};

use rep_filter::{DirectoryFilter, FilterConfig, FilterEvent, KeeperSet};

/// Run the filter over the configured root
pub fn filter_command(args: FilterArgs, verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let config = build_configuration(
        args.config.as_deref(),
        FilterOverrides::from_cli_args(&args),
    )?;
    let human = args.format == OutputFormat::Human;

    // The manifest is parsed in full before any directory is touched.
    let (keepers, stats) = KeeperSet::load_with_stats(&config.manifest_path)?;
    info!(
        "Loaded {} keepers for {} directories",
        keepers.total_keepers(),
        keepers.len()
    );

    if human && !quiet {
        print_header();
        display_config_summary(&config, &stats, &keepers);
    }

    let filter = DirectoryFilter::new(config.clone())?;
    let callback: Option<rep_filter::FilterCallback<'_>> = if human && !quiet {
        Some(Box::new(move |event: &FilterEvent| print_event(event, verbose)))
    } else {
        None
    };
    let report = filter.run(&keepers, callback)?;

    match args.format {
        OutputFormat::Human => display_report(&report, &keepers),
        OutputFormat::Json => print_json(&FilterSummary {
            manifest: &config.manifest_path,
            manifest_stats: stats,
            report: &report,
            unmatched_keys: report.unmatched_keys(&keepers),
        })?,
    }

    Ok(())
}

/// Print the keeper set parsed from the manifest
pub fn keepers_command(args: KeepersArgs) -> anyhow::Result<()> {
    let config = build_configuration(
        args.config.as_deref(),
        FilterOverrides::from_cli_args(&args),
    )?;
    let (keepers, stats) = KeeperSet::load_with_stats(&config.manifest_path)?;
    debug!("Parsed {} of {} manifest lines", stats.matched, stats.lines);

    match args.format {
        OutputFormat::Human => display_keepers(&keepers, &stats),
        OutputFormat::Json => print_json(&KeepersSummary {
            manifest: &config.manifest_path,
            manifest_stats: stats,
            keepers: &keepers,
        })?,
    }

    Ok(())
}

/// Print default configuration
pub fn print_default_config() -> anyhow::Result<()> {
    let config = FilterConfig::default();
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

/// Validate a configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let config = build_configuration(Some(args.config.as_path()), FilterOverrides::default())?;
    println!(
        "{} {}",
        "✅ Configuration is valid:".green(),
        args.config.display()
    );
    println!("  manifest_path: {}", config.manifest_path.display());
    println!("  root: {}", config.root.display());
    println!("  dry_run: {}", config.dry_run);
    Ok(())
}
