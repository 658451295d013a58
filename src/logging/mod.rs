//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local file logs with rotation
//!
//! Log events carry patient folder names, pseudonyms and counts. Source
//! identifiers (patient IDs, names, accession numbers) are never logged.
//!
//! # Example
//!
//! ```no_run
//! use linkage::logging::init_logging;
//! use linkage::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a patient directory
///
/// # Example
///
/// ```no_run
/// use linkage::log_patient_start;
///
/// log_patient_start!("patient_0042", 3);
/// ```
#[macro_export]
macro_rules! log_patient_start {
    ($patient_folder:expr, $sequences:expr) => {
        tracing::info!(
            patient_folder = %$patient_folder,
            sequences = $sequences,
            "Processing patient"
        );
    };
}

/// Log the completion of a patient directory
///
/// # Example
///
/// ```no_run
/// use linkage::log_patient_complete;
///
/// log_patient_complete!("patient_0042", 120, 2);
/// ```
#[macro_export]
macro_rules! log_patient_complete {
    ($patient_folder:expr, $files:expr, $pseudonyms:expr) => {
        tracing::info!(
            patient_folder = %$patient_folder,
            files = $files,
            pseudonyms = $pseudonyms,
            "Patient completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use linkage::log_error_with_context;
/// use linkage::domain::LinkageError;
///
/// let error = LinkageError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use linkage::log_retry_attempt;
///
/// log_retry_attempt!(2, 50, "Resource temporarily unavailable");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
