//! # rep-filter: Keep Only Representative Patches
//!
//! A clustering step groups near-duplicate repair patches and writes one
//! representative per cluster to a manifest (`final_reps.txt`). This crate
//! reads that manifest and prunes the patch directories so only the
//! representatives remain.
//!
//! ## Pipeline
//!
//! ```text
//! final_reps.txt ──► KeeperSet ──► DirectoryFilter ──► FilterReport
//!                   (manifest)      (filter)
//! ```
//!
//! The manifest is parsed completely before any directory is visited.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use rep_filter::{DirectoryFilter, FilterConfig, KeeperSet};
//!
//! fn main() -> rep_filter::Result<()> {
//!     let keepers = KeeperSet::from_manifest(Path::new("final_reps.txt"))?;
//!     let filter = DirectoryFilter::new(FilterConfig::default().with_dry_run(true))?;
//!     let report = filter.run(&keepers, None)?;
//!
//!     println!("{} patches would be removed", report.removed_count());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Shared building blocks
pub mod core {
    //! Configuration, errors and filesystem helpers.

    pub mod config;
    pub mod errors;
    pub mod file_utils;
}

pub mod filter;
pub mod manifest;

pub use crate::core::config::FilterConfig;
pub use crate::core::errors::{RepFilterError, Result};
pub use crate::filter::{
    DirectoryFilter, DirectoryOutcome, FilterCallback, FilterEvent, FilterReport, SkipReason,
    SkippedEntry,
};
pub use crate::manifest::{parse_manifest_str, KeeperSet, ManifestRecord, ParseStats, Track};
