//! Error types for the rep-filter library.
//!
//! Only two conditions are fatal to a run: a missing manifest and a failed
//! deletion. Everything else a user might consider "wrong" (malformed
//! manifest lines, directories with no manifest entry) is skipped quietly
//! and never reaches this module.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main result type for rep-filter operations.
pub type Result<T> = std::result::Result<T, RepFilterError>;

/// Error type for all rep-filter operations.
#[derive(Error, Debug)]
pub enum RepFilterError {
    /// The manifest file does not exist
    #[error("Manifest file not found: {}", path.display())]
    MissingManifest {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Removing a rejected patch file failed
    #[error("Failed to delete {}: {source}", path.display())]
    DeletionFailed {
        /// File that could not be removed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// I/O related errors other than deletion
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// An invalid glob pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Error description
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RepFilterError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the manifest was absent
    pub fn is_missing_manifest(&self) -> bool {
        matches!(self, Self::MissingManifest { .. })
    }
}

impl From<serde_yaml::Error> for RepFilterError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}
