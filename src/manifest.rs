//! Manifest parsing and the keeper set.
//!
//! A manifest is a plain text file produced by the clustering step. Each
//! interesting line names a track, a subject, a bug and the cluster whose
//! representative patch should survive, for example:
//!
//! ```text
//! efffix-efffix-original-openssl-111-null-ptr-5-foo-cluster-L3-2
//! ```
//!
//! Lines that do not have this shape are commentary and are ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::core::errors::{RepFilterError, Result};

static MANIFEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^efffix-efffix-(?P<track>original|disabled-learn)-(?P<subject>openssl-\d+)-(?P<bug_id>null-ptr-\d+).*?(?P<cluster>cluster-L\d+-\d+)",
    )
    .expect("manifest line pattern is valid")
});

/// Which variant of the repair tool produced a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Track {
    /// The unmodified tool
    Original,
    /// The tool with learning disabled
    DisabledLearn,
}

impl Track {
    /// Literal used in manifest lines and directory names
    pub fn as_str(self) -> &'static str {
        match self {
            Track::Original => "original",
            Track::DisabledLearn => "disabled-learn",
        }
    }

    fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "original" => Some(Track::Original),
            "disabled-learn" => Some(Track::DisabledLearn),
            _ => None,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields captured from one well-formed manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Tool variant
    pub track: Track,
    /// Product and version, e.g. `openssl-111`
    pub subject: String,
    /// Bug category and number, e.g. `null-ptr-5`
    pub bug_id: String,
    /// Cluster label, e.g. `cluster-L3-2`
    pub cluster_name: String,
}

impl ManifestRecord {
    /// Parse a single manifest line, returning `None` for lines that do not
    /// describe a representative.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = MANIFEST_LINE.captures(line.trim())?;
        Some(Self {
            track: Track::from_literal(&caps["track"])?,
            subject: caps["subject"].to_string(),
            bug_id: caps["bug_id"].to_string(),
            cluster_name: caps["cluster"].to_string(),
        })
    }

    /// Name of the directory holding this record's patches
    pub fn keeper_key(&self) -> String {
        format!("{}-{}-{}", self.subject, self.bug_id, self.track)
    }

    /// File name of the representative patch
    pub fn keeper_filename(&self) -> String {
        format!("rep_{}.patch", self.cluster_name)
    }
}

/// Line counts gathered while parsing a manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Total lines read
    pub lines: usize,
    /// Lines that yielded a record
    pub matched: usize,
    /// Lines ignored because they did not match
    pub skipped: usize,
}

/// Directory name to the patch file names that must survive filtering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeeperSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl KeeperSet {
    /// Create an empty keeper set
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a manifest file.
    ///
    /// A missing file is the only precondition that is checked; it yields
    /// [`RepFilterError::MissingManifest`].
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let (keepers, stats) = Self::load_with_stats(path)?;
        info!(
            "Parsed manifest {}: {} records from {} lines ({} ignored), {} directories",
            path.display(),
            stats.matched,
            stats.lines,
            stats.skipped,
            keepers.len()
        );
        Ok(keepers)
    }

    /// Read and parse a manifest file, also returning line statistics
    pub fn load_with_stats(path: &Path) -> Result<(Self, ParseStats)> {
        if !path.exists() {
            return Err(RepFilterError::MissingManifest {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| {
            RepFilterError::io(format!("Failed to read manifest: {}", path.display()), e)
        })?;
        // Invalid UTF-8 only spoils the line it sits on, which then fails to match.
        Ok(Self::parse_with_stats(&String::from_utf8_lossy(&bytes)))
    }

    /// Parse manifest text that is already in memory
    pub fn parse_with_stats(content: &str) -> (Self, ParseStats) {
        let mut keepers = Self::new();
        let mut stats = ParseStats::default();

        for (index, line) in content.lines().enumerate() {
            stats.lines += 1;
            match ManifestRecord::parse_line(line) {
                Some(record) => {
                    stats.matched += 1;
                    keepers.insert(&record);
                }
                None => {
                    stats.skipped += 1;
                    trace!("Ignoring manifest line {}: {line:?}", index + 1);
                }
            }
        }

        (keepers, stats)
    }

    /// Build a keeper set from an iterator of lines
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keepers = Self::new();
        for record in lines.into_iter().filter_map(ManifestRecord::parse_line) {
            keepers.insert(&record);
        }
        keepers
    }

    /// Add the representative named by `record`. Returns `false` if it was
    /// already present.
    pub fn insert(&mut self, record: &ManifestRecord) -> bool {
        let key = record.keeper_key();
        let filename = record.keeper_filename();
        debug!("Keeper {key}/{filename}");
        self.entries.entry(key).or_default().insert(filename)
    }

    /// Whether a directory with this exact name has any keepers
    pub fn contains_dir(&self, dir_name: &str) -> bool {
        self.entries.contains_key(dir_name)
    }

    /// Keepers for a directory, if it is listed
    pub fn keepers_for(&self, dir_name: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(dir_name)
    }

    /// Exact membership test for a file inside a listed directory
    pub fn is_keeper(&self, dir_name: &str, file_name: &str) -> bool {
        self.entries
            .get(dir_name)
            .is_some_and(|files| files.contains(file_name))
    }

    /// Number of listed directories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no directory is listed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keeper file names across all directories
    pub fn total_keepers(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Iterate over directories and their keepers in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Parse manifest text into a keeper set, ignoring statistics
pub fn parse_manifest_str(content: &str) -> KeeperSet {
    KeeperSet::parse_with_stats(content).0
}
