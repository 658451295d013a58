//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting anonymisation
//! runs.

use crate::domain::LinkageError;
use std::time::Duration;

/// Exit code reported when a run stops on a shutdown request
pub const EXIT_INTERRUPTED: i32 = 130;

/// Summary of an anonymisation run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Patient directories found under the source root
    pub total_patients: usize,

    /// Patient directories fully processed
    pub patients_completed: usize,

    /// Files read, resolved and scrubbed
    pub files_processed: usize,

    /// Files written to the target tree
    pub files_written: usize,

    /// Encounters recorded for the first time
    pub new_encounters: usize,

    /// Files whose encounter was already in the ledger
    pub reused_encounters: usize,

    /// Private fields that could not be removed
    pub unremovable_private_fields: usize,

    /// Archives produced
    pub archives_created: usize,

    /// Whether the run stopped early on a shutdown request
    pub interrupted: bool,

    /// Whether nothing was written
    pub dry_run: bool,

    /// Duration of the run
    pub duration: Duration,

    /// The error that stopped the run, if any
    pub failure: Option<RunError>,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if every patient was processed
    pub fn is_successful(&self) -> bool {
        self.failure.is_none() && !self.interrupted
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match (&self.failure, self.interrupted) {
            (Some(failure), _) => failure.exit_code,
            (None, true) => EXIT_INTERRUPTED,
            (None, false) => 0,
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_patients = self.total_patients,
            patients_completed = self.patients_completed,
            files_processed = self.files_processed,
            files_written = self.files_written,
            new_encounters = self.new_encounters,
            reused_encounters = self.reused_encounters,
            archives_created = self.archives_created,
            interrupted = self.interrupted,
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "Anonymisation run finished"
        );

        if self.unremovable_private_fields > 0 {
            tracing::warn!(
                count = self.unremovable_private_fields,
                "Some private fields could not be removed"
            );
        }

        if let Some(failure) = &self.failure {
            tracing::error!(
                error_type = ?failure.error_type,
                patient_folder = %failure.patient_folder,
                message = %failure.message,
                "Run stopped on error"
            );
        }
    }
}

/// Type of run error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorType {
    /// Retry budget exhausted
    TransientIo,
    /// Record lacks mandatory identity fields
    DataQuality,
    /// Ledger unusable
    CorruptLedger,
    /// Configuration error
    Configuration,
    /// Archive step failed
    Archive,
    /// Unknown error
    Unknown,
}

/// Run error with the patient directory it occurred in
#[derive(Debug, Clone)]
pub struct RunError {
    /// Type of error
    pub error_type: RunErrorType,

    /// Error message
    pub message: String,

    /// Patient directory being processed
    pub patient_folder: String,

    /// Exit code the CLI reports
    pub exit_code: i32,
}

impl RunError {
    /// Classifies a domain error raised while processing `patient_folder`
    pub fn from_error(error: &LinkageError, patient_folder: impl Into<String>) -> Self {
        let error_type = match error {
            LinkageError::TransientIo { .. } => RunErrorType::TransientIo,
            LinkageError::DataQuality(_) => RunErrorType::DataQuality,
            LinkageError::CorruptLedger { .. } => RunErrorType::CorruptLedger,
            LinkageError::Configuration(_) => RunErrorType::Configuration,
            LinkageError::Archive(_) => RunErrorType::Archive,
            _ => RunErrorType::Unknown,
        };
        Self {
            error_type,
            message: error.to_string(),
            patient_folder: patient_folder.into(),
            exit_code: error.exit_code(),
        }
    }
}
