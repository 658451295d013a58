//! Domain error types
//!
//! This module defines the error hierarchy for linkage. Errors are grouped the
//! way the pipeline reacts to them: transient I/O that outlived its retry
//! budget, records that cannot be linked, a ledger that cannot be trusted, and
//! configuration problems. Third-party error types are never exposed.

use std::path::PathBuf;
use thiserror::Error;

/// Main linkage error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum LinkageError {
    /// A guarded operation kept failing until its attempt budget ran out
    #[error("{operation} failed for {} after {attempts} attempt(s): {source}", path.display())]
    TransientIo {
        /// Operation class (read, write, list, serialize)
        operation: &'static str,
        /// Path the operation targeted
        path: PathBuf,
        /// Number of attempts made
        attempts: usize,
        /// Last failure observed
        #[source]
        source: std::io::Error,
    },

    /// A mandatory identity field is missing and has no fallback
    #[error("Data quality error: {0}")]
    DataQuality(String),

    /// The persisted ledger cannot be parsed or violates its format
    #[error("Corrupt ledger {}: {reason}", path.display())]
    CorruptLedger {
        /// Ledger file path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ledger contract violations
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Record reader/writer errors
    #[error("Record error: {0}")]
    Record(String),

    /// Archive step errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl LinkageError {
    /// Wraps the last I/O failure of an exhausted retry loop
    pub fn transient(
        operation: &'static str,
        path: impl Into<PathBuf>,
        attempts: usize,
        source: std::io::Error,
    ) -> Self {
        LinkageError::TransientIo {
            operation,
            path: path.into(),
            attempts,
            source,
        }
    }

    /// Builds a corrupt-ledger error
    pub fn corrupt_ledger(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LinkageError::CorruptLedger {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from an exhausted retry budget
    pub fn is_transient(&self) -> bool {
        matches!(self, LinkageError::TransientIo { .. })
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LinkageError::Configuration(_) => 2,
            LinkageError::DataQuality(_) => 3,
            LinkageError::CorruptLedger { .. } => 4,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for LinkageError {
    fn from(err: std::io::Error) -> Self {
        LinkageError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for LinkageError {
    fn from(err: serde_json::Error) -> Self {
        LinkageError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for LinkageError {
    fn from(err: toml::de::Error) -> Self {
        LinkageError::Configuration(format!("TOML parse error: {err}"))
    }
}
