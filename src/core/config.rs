//! Configuration types for rep-filter.
//!
//! The defaults reproduce the layout the clustering pipeline produces:
//! a `final_reps.txt` manifest next to a set of
//! `openssl-<n>-null-ptr-<m>-<track>` directories full of `*.patch` files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{RepFilterError, Result};

/// Default manifest file name, resolved relative to the working directory.
pub const DEFAULT_MANIFEST: &str = "final_reps.txt";

/// Default glob for candidate directory names.
pub const DEFAULT_DIRECTORY_PATTERN: &str = "openssl-*-null-ptr-*";

/// Default glob for patch file names.
pub const DEFAULT_PATCH_PATTERN: &str = "*.patch";

/// Configuration for a filtering run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Manifest listing the representative patches
    pub manifest_path: PathBuf,

    /// Directory whose entries are scanned for candidate directories
    pub root: PathBuf,

    /// Report intended deletions without touching the filesystem
    pub dry_run: bool,

    /// Glob matched against candidate directory names
    pub directory_pattern: String,

    /// Glob matched against file names inside a candidate directory
    pub patch_pattern: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            root: PathBuf::from("."),
            dry_run: false,
            directory_pattern: DEFAULT_DIRECTORY_PATTERN.to_string(),
            patch_pattern: DEFAULT_PATCH_PATTERN.to_string(),
        }
    }
}

impl FilterConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            RepFilterError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            RepFilterError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the root directory scanned for candidates
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the manifest path
    pub fn with_manifest(mut self, manifest_path: impl Into<PathBuf>) -> Self {
        self.manifest_path = manifest_path.into();
        self
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.manifest_path.as_os_str().is_empty() {
            return Err(RepFilterError::config_field(
                "manifest path must not be empty",
                "manifest_path",
            ));
        }
        if self.root.as_os_str().is_empty() {
            return Err(RepFilterError::config_field(
                "root directory must not be empty",
                "root",
            ));
        }

        validate_name_pattern(&self.directory_pattern, "directory_pattern")?;
        validate_name_pattern(&self.patch_pattern, "patch_pattern")?;
        Ok(())
    }
}

/// Patterns are matched against single path components, so they must compile
/// as globs and must not span directories.
fn validate_name_pattern(pattern: &str, field: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        return Err(RepFilterError::config_field(
            format!("{field} must not be empty"),
            field,
        ));
    }
    if pattern.contains('/') || pattern.contains('\\') {
        return Err(RepFilterError::config_field(
            format!("{field} must match a single path component, got '{pattern}'"),
            field,
        ));
    }
    glob::Pattern::new(pattern)
        .map_err(|e| RepFilterError::pattern(pattern, e.msg))?;
    Ok(())
}
