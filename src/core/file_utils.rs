//! Filesystem helpers for discovering candidate directories and patch files.
//!
//! Matching is done per directory entry against a single-component glob,
//! so nothing below the scanned directory is ever visited.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::core::errors::{RepFilterError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A compiled glob matched against bare entry names
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    pattern: Pattern,
}

impl NamePattern {
    /// Compile a glob such as `*.patch`
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled =
            Pattern::new(pattern).map_err(|e| RepFilterError::pattern(pattern, e.msg))?;
        Ok(Self {
            source: pattern.to_string(),
            pattern: compiled,
        })
    }

    /// Check a bare entry name against the pattern
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(name, MATCH_OPTIONS)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// What to do with entries whose names are not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonUtf8Names {
    /// Leave them out of the listing
    Skip,
    /// Match and report them under a lossy name
    Lossy,
}

/// A directory entry whose name matched a [`NamePattern`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchedEntry {
    /// Entry name, without any parent components. Lossy for non UTF-8 names
    pub name: String,
    /// Full path to the entry
    pub path: PathBuf,
    /// Whether the entry was a regular file when listed, following symlinks
    pub is_file: bool,
}

/// List entries of `dir` whose names match `pattern`, sorted by name.
///
/// A non UTF-8 name can never equal a manifest key or keeper, so `non_utf8`
/// decides whether such entries are dropped or kept under their lossy name.
/// The path of a kept entry is always the real one.
pub fn list_matching_entries(
    dir: &Path,
    pattern: &NamePattern,
    non_utf8: NonUtf8Names,
) -> Result<Vec<MatchedEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| {
        RepFilterError::io(format!("Failed to list directory: {}", dir.display()), e)
    })?;

    let mut matched = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| {
            RepFilterError::io(format!("Failed to read entry in: {}", dir.display()), e)
        })?;

        let file_name = entry.file_name();
        let name = match (file_name.to_str(), non_utf8) {
            (Some(name), _) => name.to_string(),
            (None, NonUtf8Names::Lossy) => file_name.to_string_lossy().into_owned(),
            (None, NonUtf8Names::Skip) => {
                warn!("Skipping entry with non UTF-8 name in {}", dir.display());
                continue;
            }
        };

        if pattern.matches(&name) {
            let path = entry.path();
            matched.push(MatchedEntry {
                name,
                is_file: is_regular_file(&path),
                path,
            });
        }
    }

    matched.sort();
    debug!(
        "{} entries in {} match '{}'",
        matched.len(),
        dir.display(),
        pattern.as_str()
    );
    Ok(matched)
}

/// Whether `path` is a regular file, following symlinks.
pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
