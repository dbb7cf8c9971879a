//! Configuration Layer Management
//!
//! Layers are applied in order: built-in defaults, then an optional YAML
//! file, then command-line overrides.

use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::cli::args::{FilterArgs, KeepersArgs};
use rep_filter::FilterConfig;

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

/// Convert CLI arguments to partial configuration overrides
pub trait FromCliArgs<T> {
    /// Create a partial configuration from CLI arguments
    fn from_cli_args(args: &T) -> Self;
}

/// Values set explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOverrides {
    pub manifest_path: Option<PathBuf>,
    pub root: Option<PathBuf>,
    /// Only `Some(true)` is produced from flags; absence keeps the file value
    pub dry_run: Option<bool>,
}

impl FromCliArgs<FilterArgs> for FilterOverrides {
    fn from_cli_args(args: &FilterArgs) -> Self {
        Self {
            manifest_path: args.manifest.clone(),
            root: args.root.clone(),
            dry_run: args.dry_run.then_some(true),
        }
    }
}

impl FromCliArgs<KeepersArgs> for FilterOverrides {
    fn from_cli_args(args: &KeepersArgs) -> Self {
        Self {
            manifest_path: args.manifest.clone(),
            ..Self::default()
        }
    }
}

impl ConfigMerge<FilterOverrides> for FilterConfig {
    fn merge_with(&mut self, other: FilterOverrides) {
        if let Some(manifest_path) = other.manifest_path {
            self.manifest_path = manifest_path;
        }
        if let Some(root) = other.root {
            self.root = root;
        }
        if let Some(dry_run) = other.dry_run {
            self.dry_run = dry_run;
        }
    }
}

/// Load a configuration file, or the defaults when none is given
pub fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<FilterConfig> {
    match config_path {
        Some(path) => FilterConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(FilterConfig::default()),
    }
}

/// Build the effective configuration for a command
pub fn build_configuration(
    config_path: Option<&Path>,
    overrides: FilterOverrides,
) -> anyhow::Result<FilterConfig> {
    let mut config = load_configuration(config_path)?;
    config.merge_with(overrides);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn filter_args(argv: &[&str]) -> FilterArgs {
        let mut full = vec!["rep-filter", "filter"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Filter(args) => args,
            _ => panic!("expected filter command"),
        }
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = build_configuration(None, FilterOverrides::default()).unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rep-filter.yml");
        fs::write(
            &config_path,
            "manifest_path: from_file.txt\nroot: file_root\ndry_run: false\n",
        )
        .unwrap();

        let args = filter_args(&["--root", "cli_root", "--dry-run"]);
        let config =
            build_configuration(Some(config_path.as_path()), FilterOverrides::from_cli_args(&args))
                .unwrap();

        assert_eq!(config.manifest_path, PathBuf::from("from_file.txt"));
        assert_eq!(config.root, PathBuf::from("cli_root"));
        assert!(config.dry_run);
    }

    #[test]
    fn test_missing_dry_run_flag_keeps_file_value() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rep-filter.yml");
        fs::write(&config_path, "dry_run: true\n").unwrap();

        let overrides = FilterOverrides::from_cli_args(&FilterArgs::default());
        let config = build_configuration(Some(config_path.as_path()), overrides).unwrap();
        assert!(config.dry_run);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rep-filter.yml");
        fs::write(&config_path, "patch_pattern: \"nested/*.patch\"\n").unwrap();

        assert!(build_configuration(Some(config_path.as_path()), FilterOverrides::default()).is_err());
    }

    #[test]
    fn test_keepers_args_only_override_manifest() {
        let args = KeepersArgs {
            manifest: Some(PathBuf::from("reps.txt")),
            ..KeepersArgs::default()
        };
        let overrides = FilterOverrides::from_cli_args(&args);
        assert_eq!(overrides.manifest_path, Some(PathBuf::from("reps.txt")));
        assert_eq!(overrides.root, None);
        assert_eq!(overrides.dry_run, None);
    }
}
