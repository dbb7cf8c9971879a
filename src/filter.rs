//! The directory filter.
//!
//! Given a [`KeeperSet`], walks the candidate directories under the
//! configured root and removes every patch file that is not a keeper for
//! its directory. Directories without a manifest entry are never touched.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::config::FilterConfig;
use crate::core::errors::{RepFilterError, Result};
use crate::core::file_utils::{list_matching_entries, NamePattern, NonUtf8Names};
use crate::manifest::KeeperSet;

/// Callback invoked for every event as the filter runs
pub type FilterCallback<'a> = Box<dyn FnMut(&FilterEvent) + 'a>;

/// Why a candidate directory was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The name matched but the entry is not a directory
    NotADirectory,
    /// The manifest lists no keepers for this name
    NotInManifest,
}

/// Progress reported while filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// A listed directory is about to be filtered
    DirectoryEntered {
        /// Directory name
        name: String,
    },
    /// A candidate was skipped
    DirectorySkipped {
        /// Entry name
        name: String,
        /// Why it was skipped
        reason: SkipReason,
    },
    /// A keeper was left in place
    Kept {
        /// Path of the kept file
        path: PathBuf,
    },
    /// A non-keeper was removed
    Deleted {
        /// Path of the removed file
        path: PathBuf,
    },
    /// A non-keeper would have been removed outside dry-run mode
    WouldDelete {
        /// Path of the file
        path: PathBuf,
    },
}

/// Result of filtering one listed directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryOutcome {
    /// Directory name, equal to its keeper key
    pub name: String,
    /// Keepers found on disk
    pub kept: Vec<String>,
    /// Files removed, or that would be removed in dry-run mode
    pub removed: Vec<String>,
    /// Keepers listed in the manifest but absent from the directory
    pub missing_keepers: Vec<String>,
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    /// Whether deletions were only simulated
    pub dry_run: bool,
    /// Listed directories that were filtered
    pub directories: Vec<DirectoryOutcome>,
    /// Candidates that were left untouched
    pub skipped: Vec<SkippedEntry>,
}

/// A candidate that was not filtered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Entry name
    pub name: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

impl FilterReport {
    /// Number of keepers found on disk
    pub fn kept_count(&self) -> usize {
        self.directories.iter().map(|d| d.kept.len()).sum()
    }

    /// Number of files removed (or that would be removed)
    pub fn removed_count(&self) -> usize {
        self.directories.iter().map(|d| d.removed.len()).sum()
    }

    /// Number of listed keepers that were not on disk
    pub fn missing_count(&self) -> usize {
        self.directories.iter().map(|d| d.missing_keepers.len()).sum()
    }

    /// Manifest keys for which no candidate directory was filtered
    pub fn unmatched_keys<'a>(&self, keepers: &'a KeeperSet) -> Vec<&'a str> {
        let seen: BTreeSet<&str> = self.directories.iter().map(|d| d.name.as_str()).collect();
        keepers
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !seen.contains(key))
            .collect()
    }
}

/// Filters candidate directories against a keeper set
#[derive(Debug)]
pub struct DirectoryFilter {
    config: FilterConfig,
    directory_pattern: NamePattern,
    patch_pattern: NamePattern,
}

impl DirectoryFilter {
    /// Create a filter after validating the configuration
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        let directory_pattern = NamePattern::new(&config.directory_pattern)?;
        let patch_pattern = NamePattern::new(&config.patch_pattern)?;
        Ok(Self {
            config,
            directory_pattern,
            patch_pattern,
        })
    }

    /// Configuration in effect
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Run the filter once over the configured root.
    ///
    /// Stops at the first failed deletion; files removed before that point
    /// stay removed.
    pub fn run(
        &self,
        keepers: &KeeperSet,
        mut callback: Option<FilterCallback<'_>>,
    ) -> Result<FilterReport> {
        let mut emit = |event: FilterEvent| {
            if let Some(cb) = callback.as_mut() {
                cb(&event);
            }
        };

        let mut report = FilterReport {
            dry_run: self.config.dry_run,
            ..FilterReport::default()
        };

        let candidates = list_matching_entries(
            &self.config.root,
            &self.directory_pattern,
            NonUtf8Names::Skip,
        )?;
        info!(
            "Found {} candidate directories under {}",
            candidates.len(),
            self.config.root.display()
        );

        for candidate in candidates {
            let reason = if !candidate.path.is_dir() {
                Some(SkipReason::NotADirectory)
            } else if !keepers.contains_dir(&candidate.name) {
                Some(SkipReason::NotInManifest)
            } else {
                None
            };

            if let Some(reason) = reason {
                debug!("Skipping {} ({reason:?})", candidate.name);
                emit(FilterEvent::DirectorySkipped {
                    name: candidate.name.clone(),
                    reason,
                });
                report.skipped.push(SkippedEntry {
                    name: candidate.name,
                    reason,
                });
                continue;
            }

            emit(FilterEvent::DirectoryEntered {
                name: candidate.name.clone(),
            });
            let outcome =
                self.filter_directory(&candidate.name, &candidate.path, keepers, &mut emit)?;
            report.directories.push(outcome);
        }

        info!(
            "Kept {} patches, {} {} across {} directories ({} skipped)",
            report.kept_count(),
            if report.dry_run { "would delete" } else { "deleted" },
            report.removed_count(),
            report.directories.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn filter_directory(
        &self,
        name: &str,
        path: &Path,
        keepers: &KeeperSet,
        emit: &mut impl FnMut(FilterEvent),
    ) -> Result<DirectoryOutcome> {
        let mut outcome = DirectoryOutcome {
            name: name.to_string(),
            ..DirectoryOutcome::default()
        };

        // Lossy names contain U+FFFD and so are never keepers.
        for patch in list_matching_entries(path, &self.patch_pattern, NonUtf8Names::Lossy)? {
            if !patch.is_file {
                debug!("Ignoring non-file entry {}", patch.path.display());
                continue;
            }

            if keepers.is_keeper(name, &patch.name) {
                emit(FilterEvent::Kept {
                    path: patch.path.clone(),
                });
                outcome.kept.push(patch.name);
                continue;
            }

            if self.config.dry_run {
                emit(FilterEvent::WouldDelete {
                    path: patch.path.clone(),
                });
            } else {
                fs::remove_file(&patch.path).map_err(|source| RepFilterError::DeletionFailed {
                    path: patch.path.clone(),
                    source,
                })?;
                emit(FilterEvent::Deleted {
                    path: patch.path.clone(),
                });
            }
            outcome.removed.push(patch.name);
        }

        if let Some(listed) = keepers.keepers_for(name) {
            outcome.missing_keepers = listed
                .iter()
                .filter(|file| !outcome.kept.contains(file))
                .cloned()
                .collect();
        }
        if !outcome.missing_keepers.is_empty() {
            warn!(
                "{}: {} listed keepers not found on disk",
                name,
                outcome.missing_keepers.len()
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const DIR: &str = "openssl-111-null-ptr-5-original";

    fn keepers() -> KeeperSet {
        KeeperSet::from_lines(["efffix-efffix-original-openssl-111-null-ptr-5-foo-cluster-L3-2"])
    }

    fn setup(root: &Path) {
        let dir = root.join(DIR);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("rep_cluster-L3-2.patch"), "keep").unwrap();
        fs::write(dir.join("rep_cluster-L9-1.patch"), "drop").unwrap();
        fs::write(dir.join("notes.txt"), "not a patch").unwrap();
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    fn filter_for(root: &Path, dry_run: bool) -> DirectoryFilter {
        DirectoryFilter::new(FilterConfig::default().with_root(root).with_dry_run(dry_run)).unwrap()
    }

    #[test]
    fn test_only_keepers_survive() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());

        let report = filter_for(temp_dir.path(), false).run(&keepers(), None).unwrap();

        assert_eq!(
            names_in(&temp_dir.path().join(DIR)),
            vec!["notes.txt", "rep_cluster-L3-2.patch"]
        );
        assert_eq!(report.kept_count(), 1);
        assert_eq!(report.removed_count(), 1);
        assert_eq!(report.directories[0].removed, vec!["rep_cluster-L9-1.patch"]);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());
        let before = names_in(&temp_dir.path().join(DIR));

        let events = RefCell::new(Vec::new());
        let report = filter_for(temp_dir.path(), true)
            .run(&keepers(), Some(Box::new(|e: &FilterEvent| events.borrow_mut().push(e.clone()))))
            .unwrap();

        assert_eq!(names_in(&temp_dir.path().join(DIR)), before);
        assert!(report.dry_run);
        assert_eq!(report.removed_count(), 1);
        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, FilterEvent::WouldDelete { .. })));
        assert!(!events
            .borrow()
            .iter()
            .any(|e| matches!(e, FilterEvent::Deleted { .. })));
    }

    #[test]
    fn test_unlisted_directories_are_untouched() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());
        let other = temp_dir.path().join("openssl-222-null-ptr-7-original");
        fs::create_dir(&other).unwrap();
        fs::write(other.join("rep_cluster-L1-1.patch"), "x").unwrap();
        fs::write(other.join("anything.patch"), "y").unwrap();

        let report = filter_for(temp_dir.path(), false).run(&keepers(), None).unwrap();

        assert_eq!(
            names_in(&other),
            vec!["anything.patch", "rep_cluster-L1-1.patch"]
        );
        assert_eq!(
            report.skipped,
            vec![SkippedEntry {
                name: "openssl-222-null-ptr-7-original".to_string(),
                reason: SkipReason::NotInManifest,
            }]
        );
    }

    #[test]
    fn test_matching_file_is_skipped_as_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(DIR), "plain file").unwrap();

        let report = filter_for(temp_dir.path(), false).run(&keepers(), None).unwrap();

        assert!(report.directories.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::NotADirectory);
        assert!(temp_dir.path().join(DIR).is_file());
    }

    #[test]
    fn test_missing_keepers_are_reported_not_errors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(DIR);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("rep_cluster-L9-1.patch"), "drop").unwrap();

        let keepers = KeeperSet::from_lines([
            "efffix-efffix-original-openssl-111-null-ptr-5-foo-cluster-L3-2",
            "efffix-efffix-original-openssl-999-null-ptr-1-foo-cluster-L1-1",
        ]);
        let report = filter_for(temp_dir.path(), false).run(&keepers, None).unwrap();

        assert!(names_in(&dir).is_empty());
        assert_eq!(report.missing_count(), 1);
        assert_eq!(
            report.directories[0].missing_keepers,
            vec!["rep_cluster-L3-2.patch"]
        );
        assert_eq!(
            report.unmatched_keys(&keepers),
            vec!["openssl-999-null-ptr-1-original"]
        );
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());
        let filter = filter_for(temp_dir.path(), false);

        filter.run(&keepers(), None).unwrap();
        let after_first = names_in(&temp_dir.path().join(DIR));
        let second = filter.run(&keepers(), None).unwrap();

        assert_eq!(names_in(&temp_dir.path().join(DIR)), after_first);
        assert_eq!(second.removed_count(), 0);
        assert_eq!(second.kept_count(), 1);
    }

    #[test]
    fn test_nested_directories_named_like_patches_are_left_alone() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());
        let nested = temp_dir.path().join(DIR).join("old.patch");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("rep_cluster-L9-9.patch"), "z").unwrap();

        filter_for(temp_dir.path(), false).run(&keepers(), None).unwrap();

        assert!(nested.join("rep_cluster-L9-9.patch").exists());
    }

    #[test]
    fn test_event_order_for_directory() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());

        let events = RefCell::new(Vec::new());
        filter_for(temp_dir.path(), false)
            .run(&keepers(), Some(Box::new(|e: &FilterEvent| events.borrow_mut().push(e.clone()))))
            .unwrap();

        let dir = temp_dir.path().join(DIR);
        assert_eq!(
            events.into_inner(),
            vec![
                FilterEvent::DirectoryEntered {
                    name: DIR.to_string()
                },
                FilterEvent::Kept {
                    path: dir.join("rep_cluster-L3-2.patch")
                },
                FilterEvent::Deleted {
                    path: dir.join("rep_cluster-L9-1.patch")
                },
            ]
        );
    }

    #[test]
    fn test_missing_root_is_an_io_error() {
        let filter = filter_for(Path::new("/nonexistent/patch/root"), false);
        assert!(matches!(
            filter.run(&keepers(), None),
            Err(RepFilterError::Io { .. })
        ));
    }

    #[test]
    fn test_deletion_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());
        let later = temp_dir.path().join("openssl-222-null-ptr-7-original");
        fs::create_dir(&later).unwrap();
        fs::write(later.join("rep_cluster-L5-5.patch"), "drop").unwrap();

        let keepers = KeeperSet::from_lines([
            "efffix-efffix-original-openssl-111-null-ptr-5-foo-cluster-L3-2",
            "efffix-efffix-original-openssl-222-null-ptr-7-foo-cluster-L1-1",
        ]);

        // The keeper sorts first; removing the next file behind the filter's
        // back makes its own removal fail regardless of privileges.
        let doomed = temp_dir.path().join(DIR).join("rep_cluster-L9-1.patch");
        let result = filter_for(temp_dir.path(), false).run(
            &keepers,
            Some(Box::new(|e: &FilterEvent| {
                if matches!(e, FilterEvent::Kept { .. }) {
                    fs::remove_file(&doomed).unwrap();
                }
            })),
        );

        match result {
            Err(RepFilterError::DeletionFailed { path, source }) => {
                assert_eq!(path, doomed);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected DeletionFailed, got {other:?}"),
        }
        assert!(later.join("rep_cluster-L5-5.patch").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_patch_names_are_deleted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        setup(temp_dir.path());
        let odd = temp_dir.path().join(DIR).join(OsStr::from_bytes(b"rep_\xff.patch"));
        fs::write(&odd, "drop").unwrap();

        let report = filter_for(temp_dir.path(), false).run(&keepers(), None).unwrap();

        assert!(!odd.exists());
        assert!(temp_dir.path().join(DIR).join("rep_cluster-L3-2.patch").exists());
        assert_eq!(report.removed_count(), 2);
        assert!(report.directories[0]
            .removed
            .contains(&"rep_\u{fffd}.patch".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_candidate_directories_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let odd = temp_dir
            .path()
            .join(OsStr::from_bytes(b"openssl-1-null-ptr-\xff-original"));
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("rep_cluster-L9-1.patch"), "stay").unwrap();

        let report = filter_for(temp_dir.path(), false).run(&keepers(), None).unwrap();

        assert!(odd.join("rep_cluster-L9-1.patch").exists());
        assert!(report.directories.is_empty());
    }
}
