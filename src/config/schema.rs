//! Configuration schema types
//!
//! This module defines the configuration structure for linkage.

use crate::anonymization::config::AnonymizationConfig;
use crate::core::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main linkage configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source, target and ledger locations
    pub paths: PathsConfig,

    /// Anonymization settings
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Attempt budgets for guarded I/O
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LinkageConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.paths.validate()?;
        self.anonymization
            .validate()
            .map_err(|e| format!("anonymization: {e:#}"))?;
        self.retry.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (resolve and scrub, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root holding one directory per patient
    pub source: PathBuf,

    /// Root receiving anonymised output
    pub target: PathBuf,

    /// Ledger file
    #[serde(default = "default_ledger_path")]
    pub ledger: PathBuf,
}

impl PathsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.source.as_os_str().is_empty() {
            return Err("paths.source cannot be empty".to_string());
        }
        if self.target.as_os_str().is_empty() {
            return Err("paths.target cannot be empty".to_string());
        }
        if self.ledger.as_os_str().is_empty() {
            return Err("paths.ledger cannot be empty".to_string());
        }
        if self.source == self.target {
            return Err("paths.source and paths.target must differ".to_string());
        }
        if self.target.starts_with(&self.source) {
            return Err("paths.target cannot be inside paths.source".to_string());
        }
        Ok(())
    }
}

/// Retry configuration
///
/// Retries are immediate; there is no backoff delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts to read one record
    #[serde(default = "default_read_attempts")]
    pub read_attempts: usize,

    /// Attempts to write one record
    #[serde(default = "default_write_attempts")]
    pub write_attempts: usize,

    /// Independent listing attempts per directory
    #[serde(default = "default_list_attempts")]
    pub list_attempts: usize,

    /// Retries inside each listing attempt
    #[serde(default = "default_list_inner_attempts")]
    pub list_inner_attempts: usize,

    /// Existence probes per check
    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: usize,

    /// Attempts to persist the ledger
    #[serde(default = "default_serialize_attempts")]
    pub serialize_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            read_attempts: default_read_attempts(),
            write_attempts: default_write_attempts(),
            list_attempts: default_list_attempts(),
            list_inner_attempts: default_list_inner_attempts(),
            probe_attempts: default_probe_attempts(),
            serialize_attempts: default_serialize_attempts(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        let budgets = [
            ("read_attempts", self.read_attempts),
            ("write_attempts", self.write_attempts),
            ("list_attempts", self.list_attempts),
            ("list_inner_attempts", self.list_inner_attempts),
            ("probe_attempts", self.probe_attempts),
            ("serialize_attempts", self.serialize_attempts),
        ];
        for (name, value) in budgets {
            if value == 0 {
                return Err(format!("retry.{name} must be >= 1"));
            }
        }
        Ok(())
    }

    /// Attempt budgets as used by [`RetryableOps`](crate::core::retry::RetryableOps)
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            read_attempts: self.read_attempts,
            write_attempts: self.write_attempts,
            list_attempts: self.list_attempts,
            list_inner_attempts: self.list_inner_attempts,
            probe_attempts: self.probe_attempts,
            serialize_attempts: self.serialize_attempts,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("record_linkage.json")
}

fn default_read_attempts() -> usize {
    50
}

fn default_write_attempts() -> usize {
    50
}

fn default_list_attempts() -> usize {
    20
}

fn default_list_inner_attempts() -> usize {
    10
}

fn default_probe_attempts() -> usize {
    40
}

fn default_serialize_attempts() -> usize {
    20
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
