//! CLI Argument Structures
//!
//! This module contains the argument definitions, command structures,
//! and output enums used by the rep-filter binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prune clustered patch directories down to their representatives
#[derive(Parser)]
#[command(name = "rep-filter")]
#[command(version = VERSION)]
#[command(about = "Keep only the representative patches listed in a cluster manifest")]
#[command(long_about = "
Reads a manifest of representative patches (final_reps.txt by default) and
deletes every other *.patch file in the matching openssl-*-null-ptr-*
directories. Directories without a manifest entry are left untouched.

Common Usage:

  # Preview what would be removed
  rep-filter filter --dry-run

  # Filter for real, using a manifest elsewhere
  rep-filter filter --manifest runs/final_reps.txt --root runs/patches

  # Show which patches the manifest keeps
  rep-filter keepers --format json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final summary
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Delete every patch that is not a listed representative
    Filter(FilterArgs),

    /// Parse the manifest and print the keeper set
    Keepers(KeepersArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a rep-filter configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Arguments for the filter command
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Manifest of representative patches [default: final_reps.txt]
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Directory containing the candidate directories [default: .]
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report intended deletions without removing anything
    #[arg(long, env = "REP_FILTER_DRY_RUN")]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for the keepers command
#[derive(Args, Debug, Clone, Default)]
pub struct KeepersArgs {
    /// Manifest of representative patches [default: final_reps.txt]
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for the validate-config command
#[derive(Args, Debug, Clone)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    #[arg(short, long)]
    pub config: PathBuf,
}

/// How results are written to stdout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured progress lines and a summary
    #[default]
    Human,
    /// A single JSON document
    Json,
}
